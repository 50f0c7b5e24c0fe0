#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("`docschema` CLI is only available with the `cli` feature");
    std::process::exit(1);
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::{fs, path::PathBuf, process};
    use structopt::StructOpt;

    #[derive(StructOpt)]
    #[structopt(name = "docschema")]
    struct Cli {
        /// A path to a JSON document to validate (may be specified multiple times).
        #[structopt(short = "d", long = "document")]
        documents: Vec<PathBuf>,

        /// The JSON Schema to validate with (i.e. schema.json).
        schema: PathBuf,
    }

    let config = Cli::from_args();
    let schema: serde_json::Value = serde_json::from_str(&fs::read_to_string(&config.schema)?)?;

    let mut success = true;
    for path in &config.documents {
        let filename = path.to_string_lossy();
        let text = fs::read_to_string(path)?;
        match docschema::parse(&text) {
            Ok(document) => {
                let diagnostics = document.validate(&schema);
                if diagnostics.is_empty() {
                    println!("{} - VALID", filename);
                } else {
                    success = false;
                    println!("{} - INVALID. Problems:", filename);
                    for (i, problem) in diagnostics.iter().enumerate() {
                        println!(
                            "{}. {}..{} [{}] {}",
                            i + 1,
                            problem.offset,
                            problem.offset + problem.length,
                            problem.severity,
                            problem.message
                        );
                    }
                }
            }
            Err(error) => {
                success = false;
                println!("{} - NOT PARSEABLE. {}", filename, error);
            }
        }
    }

    if !success {
        process::exit(1);
    }
    Ok(())
}
