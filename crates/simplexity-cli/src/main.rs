use clap::{Args, Parser, Subcommand, ValueEnum};
use log::warn;
use simplexity_lang::{CompiledProblem, Compiler, ParseMode, Vocabulary};
use simplexity_solver::{GraphicalSolver, Solver, Tableau};

#[derive(Parser)]
#[command(name = "simplexity")]
#[command(
    about = "Classical optimization methods: simplex, graphical, and transportation",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Args)]
struct LpArgs {
    /// Objective, e.g. "Maximize Z = 3x + 2y"
    #[arg(short, long)]
    objective: String,
    /// Constraint, e.g. "2x + y <= 10" (repeatable)
    #[arg(short, long = "constraint")]
    constraints: Vec<String>,
    /// Use variables x1..xN instead of x and y
    #[arg(long, value_name = "N")]
    indexed: Option<usize>,
    /// Reject terms that name no known variable
    #[arg(long)]
    strict: bool,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    format: Format,
}

impl LpArgs {
    fn compiler(&self) -> Compiler {
        let vocabulary = match self.indexed {
            Some(n) => Vocabulary::indexed(n),
            None => Vocabulary::xy(),
        };
        let mode = if self.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        };
        Compiler::with_parser(simplexity_lang::Parser::new(vocabulary).with_mode(mode))
    }

    fn compile(&self) -> CompiledProblem {
        let compiled = match self.compiler().compile_lp(&self.objective, &self.constraints) {
            Ok(c) => c,
            Err(e) => fail("Parse error", e),
        };
        for term in compiled.ignored_terms() {
            warn!("Ignored term '{term}'");
        }
        compiled
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an objective and constraints and print them in canonical form
    Parse {
        #[command(flatten)]
        lp: LpArgs,
    },
    /// Solve a linear program with the simplex method
    Simplex {
        #[command(flatten)]
        lp: LpArgs,
        /// Print every tableau
        #[arg(long)]
        steps: bool,
        /// Pivot limit
        #[arg(long, default_value_t = 10)]
        max_iterations: usize,
    },
    /// Solve a two-variable linear program with the graphical method
    Graphical {
        #[command(flatten)]
        lp: LpArgs,
        /// Tolerance for parallel lines, feasibility, and duplicate vertices
        #[arg(long, default_value_t = 1e-4)]
        tolerance: f64,
    },
    /// Initial transportation plan by the North-West Corner method
    Transport {
        /// Cost matrix, rows separated by ';' and cells by ',' (e.g. "4,6;8,3")
        #[arg(long)]
        costs: String,
        /// Supply per source, comma separated
        #[arg(long)]
        supply: String,
        /// Demand per destination, comma separated
        #[arg(long)]
        demand: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { lp } => {
            let compiled = lp.compile();
            match lp.format {
                Format::Json => {
                    let value = serde_json::json!({
                        "objective": compiled.objective,
                        "constraints": compiled.constraints,
                    });
                    print_json(&value);
                }
                Format::Pretty => {
                    println!("{}", compiled.objective);
                    for c in &compiled.constraints {
                        println!("  {c}    [slack {}]", c.slack);
                    }
                }
            }
        }
        Commands::Simplex {
            lp,
            steps,
            max_iterations,
        } => {
            let compiled = lp.compile();
            let solver = Solver::new().with_max_iterations(max_iterations);
            let solution = match solver.solve(&compiled.lp_problem) {
                Ok(s) => s,
                Err(e) => fail("Solve error", e),
            };

            match lp.format {
                Format::Json => {
                    if steps {
                        let value = serde_json::json!({
                            "solution": solution.report(),
                            "steps": solution.steps,
                        });
                        print_json(&value);
                    } else {
                        print_json(&solution.report());
                    }
                }
                Format::Pretty => {
                    if steps {
                        for (i, tableau) in solution.steps.iter().enumerate() {
                            println!("Step {}:", i + 1);
                            print_tableau(tableau);
                            println!();
                        }
                    }
                    println!("Status: OPTIMAL ({} pivots)", solution.iterations());
                    println!("Z = {:.2}", solution.objective_value);
                    for (name, value) in solution.variables.iter().zip(&solution.values) {
                        println!("  {name:6} {value:10.2}");
                    }
                    println!("Slack:");
                    for (name, value) in &solution.slack {
                        println!("  {name:6} {value:10.2}");
                    }
                }
            }
        }
        Commands::Graphical { lp, tolerance } => {
            let compiled = lp.compile();
            let solver = GraphicalSolver::new().with_tolerance(tolerance);
            let solution = match solver.solve(&compiled.lp_problem) {
                Ok(s) => s,
                Err(e) => fail("Solve error", e),
            };

            match lp.format {
                Format::Json => print_json(&solution),
                Format::Pretty => {
                    println!("Feasible vertices:");
                    for v in &solution.vertices {
                        println!("  ({:.2}, {:.2})", v.x, v.y);
                    }
                    println!(
                        "Optimal: ({:.2}, {:.2}) with Z = {:.2}",
                        solution.optimal.vertex.x, solution.optimal.vertex.y, solution.optimal.value
                    );
                }
            }
        }
        Commands::Transport {
            costs,
            supply,
            demand,
            format,
        } => {
            let costs: Vec<Vec<&str>> = costs.split(';').map(split_cells).collect();
            let (supply, demand) = (split_cells(&supply), split_cells(&demand));
            let problem = match Compiler::new().compile_transportation(&costs, &supply, &demand) {
                Ok(p) => p,
                Err(e) => fail("Input error", e),
            };
            let result = match problem.north_west_corner() {
                Ok(a) => a,
                Err(e) => fail("Solve error", e),
            };

            match format {
                Format::Json => print_json(&result),
                Format::Pretty => {
                    println!("Allocation:");
                    for row in &result.allocation {
                        let cells: Vec<String> = row.iter().map(|q| format!("{q:8.2}")).collect();
                        println!("  {}", cells.join(" "));
                    }
                    println!("Total cost: {:.2}", result.total_cost);
                }
            }
        }
    }
}

fn split_cells(text: &str) -> Vec<&str> {
    text.split(',').collect()
}

fn print_tableau(tableau: &Tableau) {
    print!("  {:6}", "Basic");
    for v in &tableau.variables {
        print!(" {v:>8}");
    }
    println!();
    for row in &tableau.rows {
        print!("  {:6}", row.basic);
        for c in &row.coefficients {
            print!(" {c:8.2}");
        }
        println!();
    }
    print!("  {:6}", "Z");
    for c in &tableau.objective_row {
        print!(" {c:8.2}");
    }
    println!();
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => fail("Serialization error", e),
    }
}

fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("{context}: {e}");
    std::process::exit(1);
}
