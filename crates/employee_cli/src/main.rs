//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `employee_core` linkage and an in-memory store round trip.
//! - Keep output deterministic for quick local sanity checks.

use employee_core::{
    core_version, ping, Candidate, EmployeeRepository, EmployeeStore, Filter, StoreConfig,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("employee_core ping={}", ping());
    println!("employee_core version={}", core_version());

    match store_round_trip() {
        Ok((created, remaining)) => {
            println!("employee_core round_trip created={created} remaining={remaining}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("employee_core round_trip error={err}");
            ExitCode::FAILURE
        }
    }
}

fn store_round_trip() -> Result<(usize, usize), Box<dyn Error>> {
    let config = StoreConfig::default();
    let conn = config.open_connection()?;
    let store = EmployeeStore::with_config(config.open_collection(&conn)?, &config);

    store.create(&Candidate::from_parts("probe", "probe", "smoke"))?;
    let created = store.find_all()?.len();

    store.delete_many(&Filter::all())?;
    let remaining = store.find_all()?.len();

    Ok((created, remaining))
}
