use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    comment_strata::apps::init_tracing();
    comment_strata::apps::run_inspect(std::env::args().skip(1))
}
