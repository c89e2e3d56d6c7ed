use color_eyre::eyre::eyre;
use killer_sudoku_dfs::debug::{DbgObserver, Sample};
use killer_sudoku_dfs::puzzle::PuzzleDef;
use killer_sudoku_dfs::ranker::MrvRanker;
use killer_sudoku_dfs::solver::FindFirstSolution;
use killer_sudoku_dfs::sudoku::StdWinCheck;

// A 4x4 block with a pillar in the middle: the boundary at (2, 2) carries
// both an across total and a down total, splitting row 2 and column 2 into
// two cages each.
fn puzzle() -> PuzzleDef {
    PuzzleDef::new()
        .across([1, 0], 19)
        .across([2, 0], 9)
        .across([2, 2], 7)
        .across([3, 0], 27)
        .across([4, 0], 21)
        .down([0, 1], 23)
        .down([0, 2], 2)
        .down([2, 2], 15)
        .down([0, 3], 19)
        .down([0, 4], 24)
        .fill_across([1, 1], 4)
        .fill([2, 1])
        .fill_across([2, 3], 2)
        .fill_across([3, 1], 4)
        .fill_across([4, 1], 4)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let def = puzzle();
    let ranker = MrvRanker;
    let win_check = StdWinCheck;
    let mut obs = DbgObserver::new().sample_print(Sample::every_n(500));
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
