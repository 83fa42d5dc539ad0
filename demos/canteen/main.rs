use canteen_sim::core::execution::sweep::mean_waiting_time;
use canteen_sim::{
    run_simulation, ConcurrencyMode, RunOptions, SimError, SimulationConfig, SweepConfig, SweepJob,
    SweepRunner, CANTEEN_HORIZON,
};
use log::info;

const REPLICATIONS: usize = 20;

fn print_config(config: &SimulationConfig) {
    println!("{}", "-".repeat(60));
    println!("Configuration:");
    for group in &config.groups {
        println!(
            "  - {}: {} windows, service {:.0}s, queue capacity {}, chosen {:.1}%",
            group.name,
            group.servers,
            group.mean_service_time,
            group.queue_capacity,
            group.probability * 100.0
        );
    }
}

fn main() -> Result<(), SimError> {
    env_logger::init();

    println!(">>> Canteen queue simulation <<<");
    let config = SimulationConfig::canteen();
    print_config(&config);

    let outcome = run_simulation(&config, RunOptions::new(CANTEEN_HORIZON, 2024))?;
    println!("{}", outcome.statistics);

    // Vary the number of snack windows and compare average waits
    let snack = config.group_id("snack").map(|g| g.index()).unwrap_or(0);
    let mut jobs = Vec::new();
    for windows in 1..=5 {
        let mut variant = config.clone();
        variant.groups[snack].servers = windows;
        jobs.extend(SweepJob::replications(
            &format!("snack={}", windows),
            &variant,
            CANTEEN_HORIZON,
            1,
            REPLICATIONS,
        ));
    }

    info!("running {} sweep jobs", jobs.len());
    let runner = SweepRunner::new(SweepConfig::new().with_concurrency(ConcurrencyMode::Rayon));
    let results = runner.run(&jobs)?;

    println!("{}", "=".repeat(60));
    println!("Snack windows vs. mean waiting time ({} runs each):", REPLICATIONS);
    for chunk in results.chunks(REPLICATIONS) {
        let label = chunk[0].label.split('#').next().unwrap_or_default();
        let rejections: u64 = chunk.iter().map(|r| r.statistics.rejections).sum();
        match mean_waiting_time(chunk) {
            Some(wait) => println!(
                "  {:<10} mean wait {:>7.2}s, rejections/run {:>5.1}",
                label,
                wait,
                rejections as f64 / chunk.len() as f64
            ),
            None => println!("  {:<10} no completions", label),
        }
    }
    Ok(())
}
