use color_eyre::eyre::eyre;
use killer_sudoku_dfs::debug::DbgObserver;
use killer_sudoku_dfs::puzzle::PuzzleDef;
use killer_sudoku_dfs::ranker::MrvRanker;
use killer_sudoku_dfs::solver::FindFirstSolution;
use killer_sudoku_dfs::sudoku::StdWinCheck;

// Loads a puzzle definition from a JSON file and solves it. The format is
// the serde form of PuzzleDef, e.g.:
//
//   {
//     "totals": [{"at": [1, 0], "dir": "across", "total": 3}, ...],
//     "fills": [[1, 1], [1, 2], ...]
//   }
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| eyre!("usage: solve-json <puzzle.json>"))?;
    let text = std::fs::read_to_string(&path)?;
    let def = PuzzleDef::from_json(&text).map_err(|e| eyre!("{}: {}", path, e))?;
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
