use clap::{arg,crate_version,Command,ArgMatches};
use treehuff::{container,Mode,Symbol,STD_OPTIONS};
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            return true;
        }
        return false;
    }
    true
}

/// Compress or expand between the files named in `cmd`
fn transform<S: Symbol>(cmd: &ArgMatches,compressing: bool) -> STDRESULT {
    let path_in = cmd.get_one::<String>("input").expect(RCH);
    let path_out = cmd.get_one::<String>("output").expect(RCH);
    if !ok_to_overwrite(path_out) {
        eprintln!("abort operation");
        return Ok(());
    }
    let mut in_file = std::fs::File::open(path_in)?;
    let mut out_file = std::fs::OpenOptions::new().write(true).truncate(true).create(true).open(path_out)?;
    if compressing {
        let (in_size,out_size) = container::compress::<S,_,_>(&mut in_file,&mut out_file,&STD_OPTIONS)?;
        eprintln!("compressed {} into {}",in_size,out_size);
    } else {
        let (in_size,out_size) = container::expand::<S,_,_>(&mut in_file,&mut out_file,&STD_OPTIONS)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }
    Ok(())
}

/// Print the compression statistics for a file
fn stats<S: Symbol>(cmd: &ArgMatches) -> STDRESULT {
    let path_in = cmd.get_one::<String>("input").expect(RCH);
    let buf = std::fs::read(path_in)?;
    println!("{}",container::Stats::measure::<S>(&buf)?);
    Ok(())
}

/// Print the code table and tree header for a file
fn table<S: Symbol>(cmd: &ArgMatches) -> STDRESULT {
    let path_in = cmd.get_one::<String>("input").expect(RCH);
    let buf = std::fs::read(path_in)?;
    let tree = treehuff::build_tree(&S::split(&buf)?)?;
    let header = treehuff::serialize_header(&tree)?;
    let code_table = treehuff::derive_code_table(&tree,Mode::Encode);
    for (symbol,code) in code_table.entries() {
        println!("{:>8} {}",symbol.label(),code);
    }
    println!("header: {}",hex::encode_upper(header));
    Ok(())
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `treehuff compress -i my_text -o my_compressed`
Expand:        `treehuff expand -i my_compressed -o my_text`
Binary file:   `treehuff compress -s byte -i my_binary -o my_compressed`
Show codes:    `treehuff table -i my_text`

The symbol kind is not stored in the compressed file, so `expand` must be
given the same `-s` that was used with `compress`.";

    let symbol_kinds = ["char","byte"];

    let mut main_cmd = Command::new("treehuff")
        .about("Compress and expand with static Huffman codes")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-s --symbols <KIND> "symbol kind").value_parser(symbol_kinds)
            .default_value("char"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-s --symbols <KIND> "symbol kind").value_parser(symbol_kinds)
            .default_value("char"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    main_cmd = main_cmd.subcommand(Command::new("stats")
        .arg(arg!(-s --symbols <KIND> "symbol kind").value_parser(symbol_kinds)
            .default_value("char"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .about("show how well a file compresses"));

    main_cmd = main_cmd.subcommand(Command::new("table")
        .arg(arg!(-s --symbols <KIND> "symbol kind").value_parser(symbol_kinds)
            .default_value("char"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .about("show the code table and tree header"));

    let matches = main_cmd.get_matches();

    if let Some((name,cmd)) = matches.subcommand() {
        let bytes = cmd.get_one::<String>("symbols").expect(RCH) == "byte";
        match (name,bytes) {
            ("compress",false) => transform::<char>(cmd,true)?,
            ("compress",true) => transform::<u8>(cmd,true)?,
            ("expand",false) => transform::<char>(cmd,false)?,
            ("expand",true) => transform::<u8>(cmd,false)?,
            ("stats",false) => stats::<char>(cmd)?,
            ("stats",true) => stats::<u8>(cmd)?,
            ("table",false) => table::<char>(cmd)?,
            ("table",true) => table::<u8>(cmd)?,
            _ => {
                eprintln!("{} not supported",name);
                return Err(Box::new(std::fmt::Error));
            }
        }
    }

    Ok(())
}
