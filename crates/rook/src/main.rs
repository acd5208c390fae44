//
// main.rs
//

use std::env;

use rook::cli::outline;

fn print_usage() {
    println!(
        "rook {}, a scope outline and chunk navigation tool for R documents.",
        env!("CARGO_PKG_VERSION")
    );
    print!(
        r#"
Usage: rook <COMMAND> [OPTIONS]

Available commands:

outline <file> [--json]      Print the scope tree of an R/Rmd/Rnw file

Other options:

--version                    Print the version
--help                       Print this help message

"#
    );
}

fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    argv.next(); // skip executable name

    match argv.next().as_deref() {
        Some("outline") => {
            env_logger::init();
            let args = outline::parse_args(&mut argv).map_err(|e| anyhow::anyhow!(e))?;
            outline::run(&args)
        }
        Some("--version") => {
            println!("rook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some("--help") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => Err(anyhow::anyhow!("Unknown argument: '{other}'")),
    }
}
