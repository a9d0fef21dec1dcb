//! Host-side helper.
//!
//! `cargo run -- snapshot` renders one frame of the background to SVG with the
//! headless renderer; `cargo run -- serve` builds the wasm package and serves
//! `static/` locally.

#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::process::{Command, ExitCode, Stdio};

    use clap::{Parser, Subcommand};
    use contour_wasm::{ContourBackground, ContourConfig, SvgSurface};

    #[derive(Parser)]
    #[command(name = "contour_wasm", about = "Contour background tooling")]
    struct Cli {
        #[command(subcommand)]
        command: Cmd,
    }

    #[derive(Subcommand)]
    enum Cmd {
        /// Render a single frame to an SVG file.
        Snapshot {
            #[arg(long, default_value_t = 1280.0)]
            width: f64,
            #[arg(long, default_value_t = 800.0)]
            height: f64,
            #[arg(long, default_value_t = 1)]
            seed: u64,
            /// Raise the bump at this viewport position, e.g. `--pointer 640,400`.
            #[arg(long, value_parser = parse_point)]
            pointer: Option<(f64, f64)>,
            #[arg(long, short, default_value = "contour.svg")]
            out: PathBuf,
        },
        /// Build the wasm package into static/pkg and serve static/.
        Serve {
            #[arg(long, default_value_t = 8000)]
            port: u16,
        },
    }

    fn parse_point(s: &str) -> Result<(f64, f64), String> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y, got `{s}`"))?;
        let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
        let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
        Ok((x, y))
    }

    fn snapshot(
        width: f64,
        height: f64,
        seed: u64,
        pointer: Option<(f64, f64)>,
        out: PathBuf,
    ) -> io::Result<()> {
        let mut background = ContourBackground::new(ContourConfig::default(), seed, width, height);
        if let Some((x, y)) = pointer {
            background.pointer_move(x, y);
            // Roughly two seconds of frames is enough for the bump to settle.
            for _ in 0..120 {
                background.tick(1.0 / 60.0);
            }
        }

        let mut svg = SvgSurface::new();
        background.render(&mut svg);
        fs::write(&out, svg.finish())?;
        println!("Wrote {}", out.display());
        Ok(())
    }

    fn serve(port: u16) -> io::Result<()> {
        println!("Building WASM pkg …");
        match Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
            .status()
        {
            Ok(st) if st.success() => {}
            Ok(_) => {
                return Err(io::Error::other("wasm-pack finished with errors"));
            }
            Err(_) => {
                eprintln!("wasm-pack not found in PATH. Serving whatever is in static/pkg.");
            }
        }

        println!("Launching local server at http://127.0.0.1:{port} …");
        let status = Command::new("python3")
            .args(["-m", "http.server", &port.to_string(), "--directory", "static"])
            .stdout(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(io::Error::other("http server exited"));
        }
        Ok(())
    }

    pub fn run() -> ExitCode {
        let cli = Cli::parse();
        let result = match cli.command {
            Cmd::Snapshot {
                width,
                height,
                seed,
                pointer,
                out,
            } => snapshot(width, height, seed, pointer, out),
            Cmd::Serve { port } => serve(port),
        };
        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    host::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
