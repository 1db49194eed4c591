//! `docent plan`: brainstorm, outline, then a structured travel plan.

use std::path::Path;

use docent_agent::TripRequest;

pub async fn run(config_path: Option<&Path>, request: TripRequest) -> Result<(), Box<dyn std::error::Error>> {
    if request.days == 0 {
        return Err("--days must be at least 1".into());
    }

    let config = super::load_config(config_path)?;
    let gateway = super::default_gateway(&config)?;

    let destination = request.destination.clone();
    eprint!("  Planning {destination}...");
    let plan = docent_agent::plan_trip(&gateway, request).await;
    eprint!("\r");
    let plan = plan?;

    println!();
    println!("  {destination}");
    println!("  {}", plan.overview);
    print_list("Daily plan", &plan.daily_plan);
    print_list("Reservations", &plan.reservations);
    print_list("Packing", &plan.packing);
    println!();

    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    println!();
    println!("  {title}:");
    if items.is_empty() {
        println!("    (none)");
    }
    for item in items {
        println!("    - {item}");
    }
}
