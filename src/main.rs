use std::{
    env, fs,
    io::{self, Write},
    path::Path,
    process::ExitCode,
};

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

use lrviz::{
    config::{Traversal, VizConfig},
    error::VizError,
    frontend::{
        parser::{Parser, TableParser},
        tree::ParseTree,
    },
    logger::{self, LogLevel},
    visualize::{render::Renderer, visualize},
};

fn main() -> ExitCode {
    let matches = Command::new("lrviz")
        .version(env!("CARGO_PKG_VERSION"))
        .author("David Voigt <david.voigt1998@gmail.com>\nLars Vogtmann")
        .about("Visualizes LR(1) parse trees as Graphviz graphs.")
        .arg(Arg::new("table")
            .long("table")
            .short('t')
            .value_name("FILE")
            .required(true)
            .help("Parser table (JSON) providing the grammar's actions, rules and symbol names."))
        .arg(Arg::new("input")
            .long("input")
            .short('i')
            .value_name("STRING")
            .conflicts_with("tree")
            .help("String to parse. Read from stdin if neither --input nor --tree is given."))
        .arg(Arg::new("tree")
            .long("tree")
            .value_name("FILE")
            .help("Visualize an already parsed tree given as JSON `[symbol, [children...]]`."))
        .arg(Arg::new("output")
            .long("output")
            .short('o')
            .value_name("PATH")
            .help("Output file. The extension selects the format (.dot/.gv or any Graphviz format \
            like .png, .pdf, .svg). Prints DOT to stdout if omitted."))
        .arg(Arg::new("config")
            .long("config")
            .short('c')
            .value_name("FILE")
            .help("Configuration file. Defaults to lrviz.toml in the working directory."))
        .arg(Arg::new("name")
            .long("name")
            .value_name("NAME")
            .help("Name of the generated digraph."))
        .arg(Arg::new("work-stack")
            .long("work-stack")
            .action(ArgAction::SetTrue)
            .help("Walk the tree with an explicit stack instead of recursion. Useful for very deep trees."))
        .arg(Arg::new("dump-tree")
            .long("dump-tree")
            .action(ArgAction::SetTrue)
            .help("Print the parse tree as JSON to stderr."))
        .arg(Arg::new("verbose")
            .short('v')
            .action(ArgAction::Count)
            .help("More log output, repeat for more detail."))
        .get_matches();

    logger::init_with_level(LogLevel::from_verbosity(matches.get_count("verbose")));

    match Runner::new(&matches).and_then(|runner| runner.run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Coordinates loading the parser, obtaining the tree and writing the graph.
struct Runner<'a> {
    args: &'a ArgMatches,
    config: VizConfig,
}

impl<'a> Runner<'a> {
    fn new(args: &'a ArgMatches) -> Result<Self, VizError> {
        let mut config = VizConfig::load(
            args.get_one::<String>("config").map(Path::new),
            &env::current_dir()?,
        )?;
        if let Some(name) = args.get_one::<String>("name") {
            config.graph_name = name.clone();
        }
        if args.get_flag("work-stack") {
            config.traversal = Traversal::WorkStack;
        }
        Ok(Self { args, config })
    }

    fn run(&self) -> Result<(), VizError> {
        let table = self.args.get_one::<String>("table").map(String::as_str).unwrap_or_default();
        let parser = TableParser::load(table)?;
        info!("loaded parser table {}", table);

        let tree = self.read_tree(&parser)?;
        if self.args.get_flag("dump-tree") {
            eprintln!("{}", tree.to_json_string());
        }

        let graph = visualize(&tree, &parser, &self.config)?;
        match self.args.get_one::<String>("output") {
            Some(path) => Renderer::new(&self.config.render).render(&graph, Path::new(path)),
            None => {
                println!("{}", graph);
                Ok(())
            }
        }
    }

    fn read_tree(&self, parser: &TableParser) -> Result<ParseTree, VizError> {
        if let Some(path) = self.args.get_one::<String>("tree") {
            return ParseTree::from_json_str(&fs::read_to_string(path)?);
        }
        let input = match self.args.get_one::<String>("input") {
            Some(input) => input.clone(),
            None => prompt("Enter string: ")?,
        };
        parser.parse(&input)
    }
}

/// Reads one line from stdin, without the line break.
fn prompt(msg: &str) -> Result<String, io::Error> {
    eprint!("{}", msg);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}
