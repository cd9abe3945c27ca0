use crate::CLAP_STYLING;
use clap::{arg, command, value_parser};
use meshwalk_core::walk::{DEFAULT_OUTPUT_PATH, DEFAULT_START_NODE};
use meshwalk_scanner::NodeEndpoint;
use meshwalk_scanner::fetch::DEFAULT_USER_AGENT;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("meshwalk")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("meshwalk")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v info, -vv debug)")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("walk")
                .about("Walk the mesh from a start node and write a map snapshot")
                .arg(
                    arg!([START])
                        .required(false)
                        .help("Node the walk starts from")
                        .default_value(DEFAULT_START_NODE),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the snapshot")
                        .default_value(DEFAULT_OUTPUT_PATH),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM>)
                        .required(false)
                        .help("Maximum simultaneous connections")
                        .value_parser(value_parser!(usize))
                        .default_value("200"),
                )
                .arg(
                    arg!(-a --"attempts" <NUM>)
                        .required(false)
                        .help("Total request attempts per node")
                        .value_parser(value_parser!(u32))
                        .default_value("5"),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout")
                        .value_parser(value_parser!(u64))
                        .default_value("120"),
                )
                .arg(
                    arg!(--"retry-min" <SECONDS>)
                        .required(false)
                        .help("Lower bound of the randomized delay between attempts")
                        .value_parser(value_parser!(u64))
                        .default_value("120"),
                )
                .arg(
                    arg!(--"retry-max" <SECONDS>)
                        .required(false)
                        .help("Upper bound of the randomized delay between attempts")
                        .value_parser(value_parser!(u64))
                        .default_value("130"),
                )
                .arg(
                    arg!(-e --"endpoint" <TEMPLATE>)
                        .required(false)
                        .help("Status document URL template, `{node}` is replaced by the node name")
                        .default_value(NodeEndpoint::DEFAULT_TEMPLATE),
                )
                .arg(
                    arg!(--"user-agent" <UA>)
                        .required(false)
                        .help("User-Agent header sent with every request")
                        .default_value(DEFAULT_USER_AGENT),
                )
                .arg(arg!(--"no-progress" "Disable the progress spinner").required(false)),
        )
        .subcommand(
            command!("info")
                .about("Print a summary of a previously written snapshot")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Snapshot to read")
                        .default_value(DEFAULT_OUTPUT_PATH),
                ),
        )
}
