mod cli;
mod tables;

use clap::{Parser, crate_version};
use chrono::Local;
use ev_planner::{merge, plan_in, prelude::*};

use crate::{
    cli::{Args, Command, PlanArgs, RatesArgs, StoreMode},
    tables::{build_metrics_table, build_plan_table, build_rates_table},
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Plan(args) => run_plan(&args)?,
        Command::Rates(args) => run_rates(&args)?,
    }

    info!("done!");
    Ok(())
}

#[instrument(skip_all)]
fn run_plan(args: &PlanArgs) -> Result {
    let now = args.now();
    let rates = args.sources.load(now, StoreMode::Update)?;
    let inputs = args.inputs(now);
    let outputs = match args.timezone {
        Some(timezone) => plan_in(&rates.confirmed, &rates.forecast, &inputs, &timezone),
        None => plan_in(&rates.confirmed, &rates.forecast, &inputs, &Local),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        println!("{}", build_plan_table(&outputs));
        println!("{}", build_metrics_table(&outputs));
    }
    Ok(())
}

#[instrument(skip_all)]
fn run_rates(args: &RatesArgs) -> Result {
    let now = args.now.unwrap_or_else(|| Local::now().fixed_offset());
    let rates = args.sources.load(now, StoreMode::ReadOnly)?;
    let merged = merge(&rates.confirmed, &rates.forecast);
    info!(n_slots = merged.len(), "merged");
    println!("{}", build_rates_table(&merged, &rates.confirmed));
    Ok(())
}
