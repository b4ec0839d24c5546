// main.rs      gif2bmp command
//
// Copyright (c) 2026  Douglas Lau
//
#![forbid(unsafe_code)]

use clap::{App, Arg, ArgMatches};
use log::warn;
use gif2bmp::block::{DisposalMethod, Frame, Preamble};
use gif2bmp::{Converter, Decoder, Stats};
use std::error::Error;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::process;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() {
    env_logger::builder().format_timestamp(None).init();
    let matches = create_app().get_matches();
    if let Err(e) = run(&matches) {
        let _ = report(e.as_ref());
        process::exit(1);
    }
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gif2bmp")
        .version(VERSION)
        .about("Convert a GIF image to an indexed BMP")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .value_name("FILE")
                .takes_value(true)
                .help("input GIF file (default: stdin)"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("FILE")
                .takes_value(true)
                .help("output BMP file (default: stdout)"),
        )
        .arg(
            Arg::with_name("log")
                .short("l")
                .long("log")
                .value_name("FILE")
                .takes_value(true)
                .help("write byte counts to a log file"),
        )
        .arg(
            Arg::with_name("show")
                .short("s")
                .long("show")
                .help("show GIF blocks on stderr"),
        )
}

/// Print an error message in red
fn report(e: &dyn Error) -> io::Result<()> {
    let mut err = StandardStream::stderr(ColorChoice::Auto);
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    err.set_color(&red)?;
    writeln!(err, "gif2bmp: {}", e)?;
    err.reset()
}

/// Run one conversion
fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let mut input: Box<dyn Read> = match matches.value_of_os("input") {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin()),
    };
    if matches.is_present("show") {
        let mut buf = vec![];
        input.read_to_end(&mut buf)?;
        let (preamble, frame) = Decoder::new(&buf[..]).decode()?;
        show(&preamble, &frame)?;
        input = Box::new(Cursor::new(buf));
    }
    let stats = match matches.value_of_os("output") {
        Some(path) => {
            let res = Converter::new().convert(input, File::create(path)?);
            if res.is_err() {
                remove_partial(path);
            }
            res?
        }
        None => Converter::new().convert(input, io::stdout())?,
    };
    if let Some(path) = matches.value_of_os("log") {
        write_log(File::create(path)?, &stats)?;
    }
    Ok(())
}

/// Remove a partially written output file
fn remove_partial(path: &OsStr) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not remove {:?}: {}", path, e);
            false
        }
    }
}

/// Write byte counts to the log
fn write_log<W: Write>(w: W, stats: &Stats) -> io::Result<()> {
    let mut w = BufWriter::new(w);
    writeln!(w, "uncodedSize = {}", stats.gif_sz)?;
    writeln!(w, "codedSize = {}", stats.bmp_sz)?;
    w.flush()
}

/// Show GIF blocks
fn show(preamble: &Preamble, frame: &Frame) -> Result<(), Box<dyn Error>> {
    let mut out = StandardStream::stderr(ColorChoice::Auto);
    let mut dflt = ColorSpec::new();
    dflt.set_fg(Some(Color::White));
    let mut yellow = ColorSpec::new();
    yellow.set_fg(Some(Color::Yellow)).set_intense(true);
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let width = preamble.screen_width();
    let height = preamble.screen_height();
    let gif = String::from_utf8_lossy(&preamble.header.version()).to_string();
    out.set_color(&bold)?;
    writeln!(out, "GIF{}, screen: {}x{}", gif, width, height)?;
    let desc = &preamble.logical_screen_desc;
    out.set_color(&dflt)?;
    writeln!(
        out,
        "  background: {}, colors: {}",
        desc.background_color_idx(),
        desc.color_table_config().len(),
    )?;
    out.set_color(&yellow)?;
    writeln!(out, "  Delay Disp   Size    X,Y Clrs Trn")?;
    let image = &frame.image_desc;
    let gc = frame.graphic_control_ext.as_ref();
    let delay = gc.map_or(0, |gc| gc.delay_time_cs());
    let disposal = match gc.map(|gc| gc.disposal_method()) {
        Some(DisposalMethod::NoAction) => "none",
        Some(DisposalMethod::Keep) => "keep",
        Some(DisposalMethod::Background) => "bg",
        Some(DisposalMethod::Previous) => "prev",
        Some(_) => "res",
        None => "-",
    };
    let trn = match gc.and_then(|gc| gc.transparent_color()) {
        Some(tc) => tc.to_string(),
        None => "-".to_string(),
    };
    out.set_color(&bold)?;
    let interlaced = if image.interlaced() { 'i' } else { ' ' };
    write!(out, "{} {:6.2}", interlaced, delay as f32 / 100f32)?;
    write!(out, " {:>4}", disposal)?;
    write!(out, " {:>6}", format!("{}x{}", image.width(), image.height()))?;
    write!(out, " {:>6}", format!("{},{}", image.left(), image.top()))?;
    let c = image.color_table_config().len();
    if c > 0 {
        write!(out, "  {:3}", c)?;
    } else {
        out.set_color(&dflt)?;
        write!(out, " {:3}g", desc.color_table_config().len())?;
    }
    writeln!(out, " {:>3}", trn)?;
    out.reset()?;
    Ok(())
}
