use cosma::milestone::valid_milestones;
use cosma::params::UniverseParameters;
use cosma::timefmt::format_timestamp;
use cosma::universe::SimulatedUniverse;

fn print_help() {
    println!("cosma — universe timeline demo");
    println!();
    println!("Usage: cosma [output.json]");
    println!();
    println!("Creates a test universe, generates its milestone timeline,");
    println!("prints it and saves it as JSON (default: universe_timeline.json).");
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return;
    }

    let output = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "universe_timeline.json".to_string());

    let params = UniverseParameters::new(
        0.27,  // matter density, 27% of the universe
        0.68,  // dark energy density
        67.4,  // Hubble constant in km/s/Mpc
        1e-10, // matter/antimatter ratio
        -1.0,  // w, a plain cosmological constant
    );

    if let Err(e) = params.validate() {
        eprintln!("Invalid parameters: {e}");
        std::process::exit(1);
    }

    let universe = SimulatedUniverse::new("Test Universe", params);
    let timeline = universe.generate_timeline();

    for m in valid_milestones(timeline.milestones()) {
        println!("{:<24} {}", m.title(), format_timestamp(m.timestamp));
    }
    println!();
    println!("Total milestones generated: {}", timeline.milestones().len());

    match timeline.save_to_file(&output) {
        Ok(()) => println!("Timeline saved to {output}"),
        Err(e) => {
            eprintln!("Failed to save timeline to {output}: {e}");
            std::process::exit(1);
        }
    }
}
