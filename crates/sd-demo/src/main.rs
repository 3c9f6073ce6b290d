//! Renders the reference scene and saves it.
//!
//! ```text
//! sd-demo [OUTPUT] [--config canvas.json]
//! ```
//!
//! `OUTPUT` defaults to `sd-demo.png`; its extension picks the format.

use sd_canvas::{Canvas, CanvasConfig, Color, DrawError};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut output = PathBuf::from("sd-demo.png");
    let mut config_path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config_path = iter.next().map(PathBuf::from),
            other => output = PathBuf::from(other),
        }
    }

    match run(output, config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("sd-demo: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(output: PathBuf, config_path: Option<PathBuf>) -> Result<(), DrawError> {
    let config = match config_path {
        Some(path) => CanvasConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => CanvasConfig::default(),
    };
    let mut canvas = Canvas::new(config)?;
    canvas.enable_deferred();
    draw_scene(&mut canvas)?;
    canvas.show();
    canvas.save(&output)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn draw_scene(canvas: &mut Canvas) -> Result<(), DrawError> {
    canvas.square(0.2, 0.8, 0.1)?;
    canvas.filled_square(0.8, 0.8, 0.2)?;
    canvas.circle(0.8, 0.2, 0.2)?;

    canvas.set_pen_color(Color::BOOK_RED);
    canvas.set_pen_radius(0.02)?;
    canvas.arc(0.8, 0.2, 0.1, 200.0, 45.0)?;

    canvas.reset_pen_radius();
    canvas.set_pen_color(Color::BOOK_BLUE);
    canvas.filled_polygon(&[0.1, 0.2, 0.3, 0.2], &[0.2, 0.3, 0.2, 0.1])?;

    canvas.set_pen_color(Color::BLACK);
    canvas.text(0.2, 0.5, "black text")?;
    canvas.set_pen_color(Color::WHITE);
    canvas.text(0.8, 0.8, "white text")?;
    Ok(())
}
