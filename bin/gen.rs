use clap::{Arg, ArgAction, Command};
use std::io::{self, Write};

const PIECES: [&str; 6] = ["Anillo", "Collar", "Aretes", "Pulsera", "Dije", "Tobillera"];
const STYLES: [&str; 5] = ["Luna", "Solitario", "Trenzado", "Corazón", "Eslabón"];
const CATEGORIES: [&str; 4] = ["Anillos", "Collares", "Aretes", ""];

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .about("Write a synthetic jewelry catalog to stdout")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(
            Arg::new("delim")
                .long("delim")
                .help("Field separator: ',' ';' or 'tab'")
                .default_value(","),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Shift the generated value pattern; same seed, same file")
                .value_parser(clap::value_parser!(u64))
                .default_value("0"),
        )
        .arg(
            Arg::new("english")
                .long("english")
                .help("Use English column names instead of Spanish")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let rows: u64 = *matches.get_one("rows").unwrap();
    let seed: u64 = *matches.get_one("seed").unwrap();
    let delim = match matches.get_one::<String>("delim").unwrap().as_str() {
        "tab" | "\\t" => "\t".to_string(),
        other => other.to_string(),
    };
    let header: [&str; 9] = if matches.get_flag("english") {
        [
            "Name", "Description", "Price", "Stock", "Category", "Status", "Image", "Material",
            "Featured",
        ]
    } else {
        [
            "Nombre",
            "Descripción",
            "Precio",
            "Stock",
            "Categoría",
            "Estado",
            "Imagen",
            "Material",
            "Destacado",
        ]
    };

    let mut out = io::BufWriter::new(io::stdout().lock());
    writeln!(&mut out, "{}", header.join(delim.as_str()))?;

    // Deterministic rows; every 50th has no name so importers can exercise skips.
    for i in 0..rows {
        writeln!(&mut out, "{}", row(i, seed, &delim).join(delim.as_str()))?;
        if i % 10_000 == 0 {
            out.flush()?; // keep buffers moving on huge runs
        }
    }

    out.flush()?;
    Ok(())
}

fn row(i: u64, seed: u64, delim: &str) -> [String; 9] {
    let k = i.wrapping_add(seed);
    let n = k as usize;
    let name = if i % 50 == 49 {
        String::new()
    } else {
        format!("{} {} {}", PIECES[n % PIECES.len()], STYLES[n % STYLES.len()], i)
    };
    let material = if k % 2 == 0 { "Oro 18k" } else { "Plata 925" };
    let price = format!("{},{:02}", 100 + (k % 900), k % 100);
    [
        name,
        format!("\"Pieza {i}, hecha a mano\""),
        quote_if_needed(&price, delim),
        (k % 40).to_string(),
        CATEGORIES[n % CATEGORIES.len()].to_string(),
        if k % 7 == 0 { "Inactivo" } else { "Activo" }.to_string(),
        format!("https://cdn.example.com/joyas/{i}.jpg"),
        material.to_string(),
        if k % 10 == 0 { "Sí" } else { "No" }.to_string(),
    ]
}

fn quote_if_needed(value: &str, delim: &str) -> String {
    if value.contains(delim) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}
