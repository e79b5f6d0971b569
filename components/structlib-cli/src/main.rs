extern crate c_ffi;
extern crate metadata_ffi as ffi;
extern crate structlib;
#[macro_use]
extern crate log;

mod report;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use ffi::Target;

fn target_arg(help: &'static str) -> Arg {
    Arg::new("target")
        .long("target")
        .value_name("TARGET")
        .help(help)
        .value_parser(|s: &str| s.parse::<Target>())
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .help("Write to FILE instead of stdout")
        .value_parser(value_parser!(PathBuf))
}

fn cli() -> Command {
    Command::new("structlib")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Describe and exercise the aggregate-returning fixture library")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("header")
                .about("Generate a C header for the exported functions")
                .arg(
                    Arg::new("cxx")
                        .long("cxx")
                        .help("Generate C++ instead of C")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("include-guard")
                        .long("include-guard")
                        .value_name("NAME")
                        .help("Wrap the header in an include guard"),
                )
                .arg(
                    Arg::new("export-macro")
                        .long("export-macro")
                        .value_name("NAME")
                        .default_value("STRUCTLIB_EXPORT")
                        .help("Macro expanding to the import qualifier of each function"),
                )
                .arg(
                    Arg::new("layout-target")
                        .long("layout-target")
                        .value_name("TARGET")
                        .help("Annotate structs with their layout on TARGET")
                        .value_parser(|s: &str| s.parse::<Target>()),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("metadata")
                .about("Print the metadata of the exported surface as JSON")
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("layout")
                .about("Print the C layout of every struct")
                .arg(target_arg("Target to compute layouts for [default: host]")),
        )
        .subcommand(
            Command::new("check").about("Compare the compiled layouts with the C layout of the host"),
        )
        .subcommand(Command::new("probe").about("Call every exported function and print the result"))
}

fn open_output(matches: &ArgMatches) -> Result<Box<dyn Write>> {
    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("couldn't create {}", path.display()))?;
            Ok(Box::new(io::BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

fn host_target() -> Result<Target> {
    match Target::host() {
        Some(target) => Ok(target),
        None => bail!("the host target has no reference layout"),
    }
}

fn header(matches: &ArgMatches) -> Result<()> {
    let config = c_ffi::Config {
        include_guard: matches.get_one::<String>("include-guard").cloned(),
        language: if matches.get_flag("cxx") {
            c_ffi::Language::Cxx
        } else {
            c_ffi::Language::C
        },
        export_macro: matches.get_one::<String>("export-macro").cloned(),
        layout_target: matches.get_one::<Target>("layout-target").copied(),
        ..Default::default()
    };
    debug!("header config: {:?}", config);

    let out = open_output(matches)?;
    c_ffi::generate(&structlib::describe(), &config, out).context("couldn't generate header")?;
    Ok(())
}

fn metadata(matches: &ArgMatches) -> Result<()> {
    let mut out = open_output(matches)?;
    serde_json::to_writer_pretty(&mut out, &structlib::describe())?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn layout(matches: &ArgMatches) -> Result<()> {
    let target = match matches.get_one::<Target>("target") {
        Some(target) => *target,
        None => host_target()?,
    };
    let stdout = io::stdout();
    report::layouts(&structlib::describe(), target, &mut stdout.lock())
}

fn check() -> Result<()> {
    let target = host_target()?;
    let stdout = io::stdout();
    let mismatches = report::check(
        &structlib::describe(),
        &structlib::compiled_layouts(),
        target,
        &mut stdout.lock(),
    )?;
    if mismatches > 0 {
        bail!("{} struct(s) differ from the C layout on {}", mismatches, target);
    }
    Ok(())
}

fn probe() -> Result<()> {
    let stdout = io::stdout();
    report::probe(&mut stdout.lock())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("header", sub)) => header(sub),
        Some(("metadata", sub)) => metadata(sub),
        Some(("layout", sub)) => layout(sub),
        Some(("check", _)) => check(),
        Some(("probe", _)) => probe(),
        _ => unreachable!("clap requires a subcommand"),
    }
}
