use color_eyre::eyre::eyre;
use killer_sudoku_dfs::debug::{DbgObserver, Sample};
use killer_sudoku_dfs::puzzle::PuzzleDef;
use killer_sudoku_dfs::ranker::MrvRanker;
use killer_sudoku_dfs::solver::FindFirstSolution;
use killer_sudoku_dfs::sudoku::StdWinCheck;

// A 3x2 block whose first sum-consistent completion repeats a digit inside
// the top-left box. The cage bounds can't see that, so the solver runs all
// the way to the win check, gets rejected, and has to back out two more
// branches before landing on the real grid.
fn puzzle() -> PuzzleDef {
    PuzzleDef::new()
        .across([1, 0], 3)
        .across([2, 0], 7)
        .across([3, 0], 11)
        .down([0, 1], 11)
        .down([0, 2], 10)
        .fill_across([1, 1], 2)
        .fill_across([2, 1], 2)
        .fill_across([3, 1], 2)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let def = puzzle();
    let ranker = MrvRanker;
    let win_check = StdWinCheck;
    let mut obs = DbgObserver::new().sample_print(Sample::at_end());
    {
        let mut finder = FindFirstSolution::new(&def, &ranker, &win_check, Some(&mut obs))
            .map_err(|e| eyre!("bad puzzle definition: {}", e))?;
        match finder.solve().map_err(|e| eyre!("solver error: {}", e))? {
            Some(solution) => print!("{}", solution.board()),
            None => println!("no solution exists"),
        }
    }
    obs.summarize();
    Ok(())
}
