//! Agent (x) against a uniformly random opponent (o).
//!
//! Run with: `cargo run --release --example tictactoe`
//!
//! Set `RUST_LOG=uct_engine=debug` to trace the search.

use uct_engine::core::SimRng;
use uct_engine::games::TicTacToe;
use uct_engine::mcts::{MCTSAgent, MCTSError, SearchConfig};

fn main() -> Result<(), MCTSError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("uct_engine=info".parse().expect("valid directive")),
        )
        .init();

    let config = SearchConfig::default().with_budget(1_000, 5.0);
    let mut agent = MCTSAgent::new(TicTacToe::new(), &config)?;
    let mut opponent = SimRng::new(config.seed.wrapping_add(1));
    let mut opponent_move = None;

    println!("{}", agent.current_state());
    loop {
        let Some(mv) = agent.genmove(opponent_move.as_ref())? else {
            break;
        };
        println!("Agent plays {}", mv);
        agent.feedback();
        println!("{}", agent.current_state());

        opponent_move = agent.current_state().random_move(&mut opponent);
        match &opponent_move {
            Some(mv) => println!("Opponent plays {}", mv),
            None => break,
        }
    }

    // genmove has already applied the opponent's final move
    let final_state = agent.current_state();
    println!("{}", final_state);
    match final_state.outcome() {
        Some(outcome) => println!("Result: {}", outcome),
        None => println!("Result: unfinished"),
    }
    Ok(())
}
