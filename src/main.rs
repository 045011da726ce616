use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use std::{path::PathBuf, process::ExitCode};

use vendas_cli::{load_sales, render, DateRange, Format, Logging, Report, DEFAULT_LOG_FILE};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Gerador de relatório de vendas",
    after_help = "Exemplos:
  vendas-cli vendas.csv
  vendas-cli vendas.csv --format json
  vendas-cli vendas.csv --start 2025-01-01 --end 2025-03-31 --format text
  vendas-cli vendas.csv --format pdf --name relatorio.pdf"
)]
struct Args {
    /// Caminho do arquivo CSV
    csv_path: PathBuf,
    /// Formato da saída
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Data inicial, inclusiva
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: Option<String>,
    /// Data final, inclusiva
    #[arg(long, value_name = "YYYY-MM-DD")]
    end: Option<String>,
    /// Nome do arquivo PDF gerado (apenas com --format pdf)
    #[arg(long, value_name = "PATH")]
    name: Option<PathBuf>,
    /// Nível de log (error, warn, info, debug, trace)
    #[arg(long, env = "VENDAS_LOG_LEVEL", default_value = "info")]
    log_level: String,
    /// Arquivo de log, sobrescrito a cada execução
    #[arg(long, env = "VENDAS_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = match Logging::new(&args.log_level)
        .with_file(&args.log_file)
        .init()
    {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", error_line(&e));
            return ExitCode::FAILURE;
        }
    };
    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:?}");
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String> {
    info!("run started with file {}", args.csv_path.display());
    if args.name.is_some() && args.format != Format::Pdf {
        warn!("--name is only used with --format pdf; ignoring it");
    }
    let range = DateRange::parse(args.start.as_deref(), args.end.as_deref())?;
    let sales = load_sales(&args.csv_path, &range)?;
    let report = Report::from_records(sales);
    let output = render(&report, args.format, args.name.as_deref())?;
    info!("report generated as {:?}", args.format);
    Ok(output)
}

/// Formats an error and its causes as the single line shown to the user.
fn error_line(e: &anyhow::Error) -> String {
    format!("Erro: {e:#}").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{error::ErrorKind, CommandFactory};

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("vendas-cli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn format_defaults_to_text() {
        let args = parse(&["vendas.csv"]);
        assert_eq!(args.format, Format::Text);
        assert_eq!(args.csv_path, PathBuf::from("vendas.csv"));
        assert_eq!(args.start, None);
        assert_eq!(args.name, None);
    }

    #[test]
    fn format_accepts_only_known_values() {
        assert_eq!(parse(&["v.csv", "--format", "json"]).format, Format::Json);
        assert_eq!(parse(&["v.csv", "--format", "pdf"]).format, Format::Pdf);
        let err = Args::try_parse_from(["vendas-cli", "v.csv", "--format", "xml"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn run_rejects_bad_start_date_before_opening_the_file() {
        let args = parse(&["testdata/bogus.csv", "--start", "2025-13-01"]);
        let err = run(&args).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("bad start date"), "{message}");
        assert!(!message.contains("opening"), "{message}");
    }

    #[test]
    fn run_returns_error_for_missing_file() {
        let err = run(&parse(&["testdata/bogus.csv"])).unwrap_err();
        assert!(format!("{err:#}").contains("opening testdata/bogus.csv"));
    }

    #[test]
    fn run_renders_text_for_date_range() {
        let output = run(&parse(&[
            "testdata/vendas.csv",
            "--start",
            "2025-01-15",
            "--end",
            "2025-02-10",
        ]))
        .unwrap();
        assert!(output.starts_with("RELATORIO DE VENDAS"));
        assert!(output.contains("PRODUTO MAIS VENDIDO:       Mochila"));
        assert!(!output.contains("Ana"));
    }

    #[test]
    fn run_writes_pdf_and_confirms_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("relatorio.pdf");
        let target_str = target.to_str().unwrap();
        let output = run(&parse(&[
            "testdata/vendas.csv",
            "--format",
            "pdf",
            "--name",
            target_str,
        ]))
        .unwrap();
        assert_eq!(output, format!("Relatório PDF gerado em: {target_str}"));
        assert!(target.exists());
    }

    #[test]
    fn error_line_is_a_single_prefixed_line() {
        let err = anyhow::anyhow!("invalid date\n\"x\"").context("bad start date");
        let line = error_line(&err);
        assert!(line.starts_with("Erro: bad start date: "));
        assert!(!line.contains('\n'));
    }
}
