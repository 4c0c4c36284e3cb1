#![forbid(unsafe_code)]
use std::path::PathBuf;
use std::{env, ffi, fs, io, process};

use lzwdec::decode::{Decoder, OutputBound};

fn main() -> CodingResult {
    env_logger::init();
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os()).unwrap_or_else(|ParamError| explain());
        run_coding(flags)
    })
}

fn run_coding(flags: Flags) -> Result<(), io::Error> {
    let decoder = Decoder::with_output_bound(flags.bound);
    log::debug!("decoding {:?} with {:?}", flags.input, flags.bound);

    let out = io::stdout();
    let out = out.lock();

    let result = match flags.input {
        Input::File(file) => {
            let data = fs::File::open(file)?;
            let file = io::BufReader::with_capacity(1 << 20, data);
            decoder.into_stream(io::BufWriter::new(out)).decode_all(file)
        }
        Input::Stdin => {
            let input = io::BufReader::with_capacity(1 << 20, io::stdin());
            decoder.into_stream(io::BufWriter::new(out)).decode_all(input)
        }
    };

    log::info!(
        "read {} bytes, wrote {} bytes",
        result.bytes_read,
        result.bytes_written
    );
    result.status
}

struct Flags {
    input: Input,
    bound: OutputBound,
}

struct ParamError;

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

fn explain<T>() -> T {
    println!(
        "Usage: lzw [-b end|input|<count>] <file>\n\
        Arguments:\n\
        -b\t when to stop decoding: at the end code (default), once the output\n\
        \t is as long as the input, or after <count> output bytes\n\
        <file>\tfilepath or '-' for stdin"
    );
    process::exit(1);
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            bound: OutputBound::EndCode,
        }
    }
}

fn command() -> clap::Command<'static> {
    clap::Command::new("lzw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode MSB-first LZW data with 9 to 12 bit codes")
        .arg(
            clap::Arg::new("bound")
                .short('b')
                .long("bound")
                .takes_value(true)
                .value_parser(clap::value_parser!(String))
                .default_value("end"),
        )
        .arg(
            clap::Arg::new("file")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(mut args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let mut flags = Flags::default();
        let matches = command()
            .try_get_matches_from(args.by_ref())
            .map_err(|_| ParamError)?;

        match matches.get_one::<String>("bound").map(String::as_str) {
            None | Some("end") => flags.bound = OutputBound::EndCode,
            Some("input") => flags.bound = OutputBound::InputLength,
            Some(count) => match count.parse() {
                Ok(count) => flags.bound = OutputBound::Limit(count),
                Err(_) => return Err(ParamError),
            },
        }

        match matches.get_one::<PathBuf>("file") {
            None => flags.input = Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => flags.input = Input::Stdin,
            Some(p) => flags.input = Input::File(p.clone()),
        }

        Ok(flags)
    }
}

enum CodingResult {
    Ok,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), io::Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
