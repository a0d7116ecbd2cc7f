use std::error::Error;
use vpc_topology_planner::config::{load_config, DEFAULT_CONFIG_FILE};
use vpc_topology_planner::output::{print_plan, PlanDocument};
use vpc_topology_planner::{plan_stack, stack_name};

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())?;
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let config_file =
        std::env::var("PLANNER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let teardown = std::env::var("PLANNER_TEARDOWN").is_ok_and(|v| v == "1" || v == "true");
    let json = std::env::var("PLANNER_OUTPUT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let config = load_config(&config_file)?;
    let stack = stack_name(&config);
    let graph = plan_stack(&config)?;
    log::info!("Planned stack '{stack}' with {} resources", graph.len());

    if json {
        let doc = PlanDocument::new(stack, &graph, config.backend_for(stack))?;
        println!("{}", doc.to_json()?);
    } else {
        print_plan(&graph, teardown)?;
    }

    Ok(())
}
