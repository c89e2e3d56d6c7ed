use color_eyre::eyre::eyre;
use killer_sudoku_dfs::debug::DbgObserver;
use killer_sudoku_dfs::puzzle::PuzzleDef;
use killer_sudoku_dfs::ranker::MrvRanker;
use killer_sudoku_dfs::solver::FindFirstSolution;
use killer_sudoku_dfs::sudoku::StdWinCheck;

// Warmup puzzle: a 2x2 block where the cage sums pin down the grid without
// any backtracking.
fn puzzle() -> PuzzleDef {
    PuzzleDef::new()
        .across([1, 0], 3)
        .across([2, 0], 7)
        .down([0, 1], 4)
        .down([0, 2], 6)
        .fill_across([1, 1], 2)
        .fill_across([2, 1], 2)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let def = puzzle();
    let ranker = MrvRanker;
    let win_check = StdWinCheck;
    let mut obs = DbgObserver::new();
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
