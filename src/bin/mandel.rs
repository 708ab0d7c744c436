use clap::{App, Arg, ArgMatches};
use image::ColorType;
use log::info;
use mandelbrot::{EngineConfig, FractalEngine, Raster, RenderState, Selection, Viewport};
use num::Complex;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

/// `x,y,width,height` of a pixel-space rectangle.
fn parse_rect(s: &str) -> Option<Selection> {
    let parts: Vec<f64> = s
        .split(',')
        .map(f64::from_str)
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [x, y, w, h] => Some(Selection::from_rect(*x, *y, *w, *h)),
        _ => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const ZOOM: &str = "zoom";
const JULIA: &str = "julia";
const JULIA_OUTPUT: &str = "julia-output";
const SKIP_INTERIOR: &str = "skip-interior";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .about("Mandelbrot and Julia set renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file for the Mandelbrot set"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-1.6")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the complex plane"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2.0,1.6")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the complex plane"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| match parse_rect(&s) {
                    Some(_) => Ok(()),
                    None => Err("Could not parse zoom rectangle".to_string()),
                })
                .help("Pixel rectangle x,y,width,height to zoom into before rendering"),
        )
        .arg(
            Arg::with_name(JULIA)
                .required(false)
                .long(JULIA)
                .short("j")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("Also render the Julia set for this constant"),
        )
        .arg(
            Arg::with_name(JULIA_OUTPUT)
                .required(false)
                .long(JULIA_OUTPUT)
                .takes_value(true)
                .default_value("juliaset.png")
                .help("Output file for the Julia set"),
        )
        .arg(
            Arg::with_name(SKIP_INTERIOR)
                .long(SKIP_INTERIOR)
                .help("Don't iterate points inside the main cardioid and period-2 bulb"),
        )
        .get_matches()
}

fn write_image(outfile: &str, raster: &Raster) -> Result<(), String> {
    image::save_buffer(
        Path::new(outfile),
        &raster.to_rgb8(),
        raster.width() as u32,
        raster.height() as u32,
        ColorType::RGB(8),
    )
    .map_err(|e| format!("Could not write {}: {}", outfile, e))
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let image_size: (usize, usize) =
        parse_pair(matches.value_of(SIZE).unwrap(), 'x').ok_or("Error parsing image dimensions")?;
    let leftlower = parse_complex(matches.value_of(LEFTLOWER).unwrap())
        .ok_or("Error parsing left lower point")?;
    let rightupper = parse_complex(matches.value_of(RIGHTUPPER).unwrap())
        .ok_or("Error parsing right upper point")?;
    let threads = match matches.value_of(THREADS) {
        Some(t) => usize::from_str(t).map_err(|_| "Could not parse thread count.")?,
        None => num_cpus::get(),
    };
    let iterations = usize::from_str(matches.value_of(ITERATIONS).unwrap())
        .map_err(|_| "Could not parse iteration count.")?;

    let config = EngineConfig {
        width: image_size.0,
        height: image_size.1,
        threads,
        max_iterations: iterations,
        viewport: Viewport::from_corners(leftlower, rightupper).map_err(|e| e.to_string())?,
        skip_interior: matches.is_present(SKIP_INTERIOR),
        ..EngineConfig::default()
    };
    let mut engine = FractalEngine::new(config).map_err(|e| e.to_string())?;

    let started = match matches.value_of(ZOOM).and_then(parse_rect) {
        Some(selection) => engine.zoom_to(selection),
        None => engine.rerender(),
    };
    started.map_err(|e| e.to_string())?;

    let redraws = engine.redraw_requests();
    while engine.state() == RenderState::Running {
        if redraws.recv_timeout(Duration::from_millis(250)).is_ok() {
            info!("{:.0}% rendered", engine.current_progress() * 100.0);
        }
    }
    let state = engine.wait();
    if state != RenderState::Completed {
        return Err(format!("Render did not complete: {:?}", state));
    }
    let viewport = engine.viewport();
    info!(
        "rendered x {}..{}, y {}..{} at {} iterations",
        viewport.x_min(),
        viewport.x_max(),
        viewport.y_min(),
        viewport.y_max(),
        engine.max_iterations()
    );
    write_image(matches.value_of(OUTPUT).unwrap(), &engine.pixel_buffer())?;

    if let Some(c) = matches.value_of(JULIA).and_then(parse_complex) {
        engine
            .render_julia(c, iterations)
            .map_err(|e| e.to_string())?;
        let outfile = matches.value_of(JULIA_OUTPUT).unwrap();
        write_image(outfile, &engine.julia_buffer())?;
        info!("Julia set for {} saved as {}", c, outfile);
    }
    Ok(())
}

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
