use soda_run::solver::pipeline;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pipeline::run()
}
