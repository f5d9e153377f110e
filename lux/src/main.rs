use std::fs::File;
use std::io::{BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process::exit;

use lux::{config, film, renderer};

fn main() {
    env_logger::init();
    exit(run());
}

fn run() -> i32 {
    let mut args = std::env::args().skip(1);
    let path = match (args.next(), args.next()) {
        (Some(path), None) => path,
        _ => {
            eprintln!("usage: lux <scene-file>");
            return 1;
        }
    };

    log::info!("reading {path}");
    let mut scene = match config::load_scene(&path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("{path}: {e}");
            return 2;
        }
    };

    if scene.photon_samples > 0 {
        log::info!("building photon map");
    }
    scene.build_photon_map();

    let rendered = panic::catch_unwind(AssertUnwindSafe(|| renderer::render(&scene)));
    let image = match rendered {
        Ok(Ok(image)) => image,
        Ok(Err(e)) => {
            eprintln!("render failed: {e}");
            return 3;
        }
        Err(cause) => {
            let msg = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "worker panicked".to_string());
            eprintln!("render failed: {msg}");
            return 3;
        }
    };

    log::info!("image hash {:016x}", film::image_hash(&image));

    let out_path = format!("{path}.pnm");
    let written = File::create(&out_path).and_then(|f| {
        let mut w = BufWriter::new(f);
        film::write_pnm(&image, &mut w)?;
        w.flush()
    });

    match written {
        Ok(()) => {
            log::info!("wrote {out_path}");
            0
        }
        Err(e) => {
            eprintln!("{out_path}: {e}");
            4
        }
    }
}
