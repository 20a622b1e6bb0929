use std::env;

use anyhow::{anyhow, Context, Result};
use log::info;

use threeds::{dump_material, MaterialFile};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let file = MaterialFile::open(&options.path)
        .with_context(|| format!("failed to read {}", options.path))?;
    info!("{} uses a {:?} container", options.path, file.kind);

    if options.json {
        let json = serde_json::to_string_pretty(&file.materials)
            .context("failed to serialize materials")?;
        println!("{json}");
    } else {
        println!(
            "Loaded {} material(s) (version {})",
            file.materials.len(),
            file.version
        );
        for (index, material) in file.materials.iter().enumerate() {
            println!("material {index}:");
            print!("{}", dump_material(material));
        }
    }

    if let Some(out) = &options.rewrite {
        file.save(out)
            .with_context(|| format!("failed to write {out}"))?;
        println!("Wrote {} material(s) to {out}", file.materials.len());
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    path: String,
    json: bool,
    rewrite: Option<String>,
}

impl CliOptions {
    const USAGE: &'static str = "Usage: threeds-dump <file.3ds|file.mli> [--json] [--rewrite <out>]";

    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let Some(path) = args.next() else {
            return Err(anyhow!(Self::USAGE));
        };
        let mut json = false;
        let mut rewrite = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json" => json = true,
                "--rewrite" => {
                    let out = args
                        .next()
                        .ok_or_else(|| anyhow!("--rewrite expects an output path"))?;
                    rewrite = Some(out);
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --json or --rewrite <out>"
                    ));
                }
            }
        }
        Ok(Self {
            path,
            json,
            rewrite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_all_options() {
        let options = parse(&["scene.3ds", "--json", "--rewrite", "out.3ds"]).unwrap();
        assert_eq!(
            options,
            CliOptions {
                path: "scene.3ds".into(),
                json: true,
                rewrite: Some("out.3ds".into()),
            }
        );
    }

    #[test]
    fn missing_path_prints_usage() {
        let err = parse(&[]).unwrap_err();
        assert!(err.to_string().starts_with("Usage:"));
    }

    #[test]
    fn rejects_unknown_flags_and_dangling_rewrite() {
        assert!(parse(&["a.3ds", "--verbose"]).is_err());
        assert!(parse(&["a.3ds", "--rewrite"]).is_err());
    }
}
