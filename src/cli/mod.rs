pub mod commands;

use clap::Parser;
pub use commands::*;

#[derive(Parser, Debug)]
#[command(name = "speedtest-app")]
#[command(about = "Internet speed checker with a web page, result logs and exports")]
#[command(
    long_about = "Measures download speed, upload speed and ping against the closest configured server,\nclassifies the connection as fast or slow, and keeps the results in:\n• a result store shown on the web page and used for exports\n• a JSON log file\n• a CSV log file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::export::ExportFormat;

    #[test]
    fn test_parse_export_command() {
        let cli = Cli::try_parse_from([
            "speedtest-app",
            "export",
            "--format",
            "csv",
            "--store",
            "results.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Export {
                common,
                format,
                output,
            } => {
                assert_eq!(format, ExportFormat::Csv);
                assert_eq!(common.store.unwrap().to_str(), Some("results.json"));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_reject_unknown_export_format() {
        assert!(Cli::try_parse_from(["speedtest-app", "export", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "speedtest-app",
            "serve",
            "--port",
            "9000",
            "--bind",
            "127.0.0.1",
            "--no-cors",
        ])
        .unwrap();

        let Commands::Serve {
            port,
            bind,
            no_cors,
            common,
        } = cli.command
        else {
            panic!("expected serve");
        };
        assert_eq!(port, Some(9000));
        assert_eq!(bind.unwrap().to_string(), "127.0.0.1");
        assert!(no_cors);
        assert!(common.config.is_none());
    }
}
