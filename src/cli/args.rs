use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "crawltable",
    version,
    about = "render crawl responses as an HTML table",
    long_about = "crawltable reads back-to-back JSON crawl response documents and writes a single HTML page with a sortable, searchable, exportable table.\n\nWith no arguments it reads ./data.json and writes ./output.html. A config file is only read when --config is given.\n\nExamples:\n  crawltable\n  crawltable -i crawl.json -o report.html\n  crawltable -vv --config ~/crawltable.yml"
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'i',
        long = "in",
        visible_alias = "input",
        value_name = "FILE",
        help_heading = "Input",
        help = "Crawl data file with concatenated JSON documents (default: data.json)."
    )]
    pub input: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "YAML config file with input, output, no_color and verbose keys."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "HTML report to write, truncated if it exists (default: output.html)."
    )]
    pub output: Option<String>,
}
