use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use solver::Strategy;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| usage());
    let strategy = match args.next() {
        Some(name) => Strategy::from_name(&name).unwrap_or_else(|| usage()),
        None => Strategy::Optimize,
    };
    let routes_extension = args.next().map(|extension_path| read_json(&extension_path));

    let input = read_json(&path);
    println!("\n---------- RUN: {} ----------", path);

    let (network, assignment, solved) = solver::run(&input, routes_extension.as_ref(), strategy)
        .expect("Error loading the instance");

    if solved {
        println!("Feasible assignment found:");
        if let Some(assignment) = &assignment {
            print!("{}", assignment);
        }
    } else {
        println!("No feasible assignment found.");
    }

    let output = model::json_serialisation::network_to_json(&network);
    let output_path = ensure_output_path(&path, "output");
    let file = File::create(&output_path).expect("Error creating file");
    serde_json::to_writer_pretty(file, &output).expect("Error writing JSON");
    println!("Solved network written to {}", output_path);
}

fn usage() -> ! {
    eprintln!(
        "usage: wardrop <instance.json> \
         [optimize|descending-price|descending-price-obj|binary-search-capacity|inflate-capacity] \
         [routes-extension.json]"
    );
    std::process::exit(1);
}

fn read_json(path: &str) -> serde_json::Value {
    let mut file = File::open(path).unwrap_or_else(|error| {
        eprintln!("Error: the file {} was not found ({})", path, error);
        std::process::exit(1);
    });
    let mut input_data = String::new();
    file.read_to_string(&mut input_data).expect("Error reading file");
    serde_json::from_str(&input_data).expect("Error parsing JSON")
}

fn ensure_output_path(input_path: &str, output_dir_name: &str) -> String {
    let file_name = Path::new(input_path)
        .file_name()
        .expect("Error getting file name")
        .to_str()
        .expect("Error converting file name to string");
    let output_path = format!("{}/output_{}", output_dir_name, file_name);
    if let Some(parent_dir) = Path::new(&output_path).parent() {
        fs::create_dir_all(parent_dir).expect("Error creating directories");
    }
    output_path
}
