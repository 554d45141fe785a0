use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use rank_eval::bench::{write_report, Benchmark, DEFAULT_TOP_K};
use rank_eval::config::{
    JudgeBackend, JudgeConfig, ModelParams, DEFAULT_CACHE_PATH, DEFAULT_GEMINI_MODEL,
    DEFAULT_GROQ_MODEL,
};
use rank_eval::index::{Corpus, CorpusIndex};
use rank_eval::judge::LlmJudge;
use rank_eval::models::ModelKind;
use rank_eval::ranking::Ranker;
use rank_eval::types::BenchmarkReport;

const DEFAULT_CORPUS: &str = "data/corpus.json";
const DEFAULT_REPORT: &str = "reports/llm_judge_benchmark.json";
const DEFAULT_QUERY: &str = "machine learning artificial intelligence";

#[derive(Parser)]
#[command(name = "rank-eval")]
#[command(about = "Rank a corpus with classic IR models and compare them by nDCG", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ParamArgs {
    /// BM25 term-frequency saturation
    #[arg(long, default_value_t = 1.5)]
    k1: f64,
    /// BM25 length normalization
    #[arg(long, default_value_t = 0.75)]
    b: f64,
    /// Jelinek-Mercer document-model weight
    #[arg(long, default_value_t = 0.5)]
    lambda: f64,
}

impl ParamArgs {
    fn params(&self) -> Result<ModelParams> {
        let params = ModelParams {
            k1: self.k1,
            b: self.b,
            lambda: self.lambda,
        };
        params.validate()?;
        Ok(params)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the corpus for one query with one model
    Search {
        /// Corpus file (.json or .jsonl)
        #[arg(long, default_value = DEFAULT_CORPUS)]
        corpus: PathBuf,
        /// Model: vsm, bm25, lm or boolean
        #[arg(long, default_value = "bm25")]
        model: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        #[command(flatten)]
        params: ParamArgs,
        /// Query text; boolean queries may use AND, OR, NOT and parentheses
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Compare models on a query set, judged by an LLM or the lexical heuristic
    Bench {
        #[arg(long, default_value = DEFAULT_CORPUS)]
        corpus: PathBuf,
        /// Query to evaluate (repeatable)
        #[arg(long = "query")]
        queries: Vec<String>,
        /// File with one query per line; blank lines and lines starting with # are skipped
        #[arg(long)]
        queries_file: Option<PathBuf>,
        /// Comma-separated models; defaults to all four
        #[arg(long, value_delimiter = ',')]
        models: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        #[command(flatten)]
        params: ParamArgs,
        /// Judge backend: auto, gemini, groq or heuristic
        #[arg(long, env = "LLM_JUDGE_BACKEND", default_value = "auto")]
        judge: String,
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        gemini_api_key: Option<String>,
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, hide = true)]
        google_api_key: Option<String>,
        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        groq_api_key: Option<String>,
        #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
        gemini_model: String,
        #[arg(long, env = "GROQ_MODEL", default_value = DEFAULT_GROQ_MODEL)]
        groq_model: String,
        /// Minimum milliseconds between Gemini calls
        #[arg(long, env = "GEMINI_MIN_DELAY_MS")]
        gemini_min_delay_ms: Option<u64>,
        /// Retries after an HTTP 429 from Gemini
        #[arg(long, env = "GEMINI_MAX_RETRIES", default_value_t = 2)]
        gemini_max_retries: u32,
        /// HTTP timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
        #[arg(long, default_value = DEFAULT_CACHE_PATH)]
        cache_path: PathBuf,
        /// JSON report destination
        #[arg(long, default_value = DEFAULT_REPORT)]
        report: PathBuf,
        #[arg(long, default_value_t = false)]
        no_report: bool,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            corpus,
            model,
            top_k,
            params,
            query,
        } => search(&corpus, &model, top_k, &params.params()?, &query.join(" ")),
        Commands::Bench {
            corpus,
            queries,
            queries_file,
            models,
            top_k,
            params,
            judge,
            gemini_api_key,
            google_api_key,
            groq_api_key,
            gemini_model,
            groq_model,
            gemini_min_delay_ms,
            gemini_max_retries,
            timeout_secs,
            cache_path,
            report,
            no_report,
        } => {
            let mut queries = queries;
            if let Some(path) = queries_file {
                queries.extend(read_queries(&path)?);
            }
            if queries.is_empty() {
                queries.push(DEFAULT_QUERY.to_string());
            }

            let models = if models.is_empty() {
                ModelKind::ALL.to_vec()
            } else {
                models
                    .iter()
                    .map(|name| name.parse::<ModelKind>())
                    .collect::<Result<Vec<_>, _>>()?
            };

            let config = JudgeConfig {
                backend: JudgeBackend::parse_lenient(&judge),
                gemini_model,
                groq_model,
                gemini_api_key: gemini_api_key.or(google_api_key),
                groq_api_key,
                cache_path,
                min_delay: gemini_min_delay_ms.map(Duration::from_millis),
                max_retries: gemini_max_retries,
                timeout: Duration::from_secs(timeout_secs),
            };

            let benchmark = Benchmark {
                models,
                top_k,
                params: params.params()?,
            };
            let report_path = (!no_report).then_some(report);
            bench(&corpus, &queries, benchmark, config, report_path.as_deref())
        }
    }
}

fn load_index(path: &Path) -> Result<CorpusIndex> {
    let corpus = Corpus::load(path).with_context(|| format!("loading corpus {}", path.display()))?;
    Ok(CorpusIndex::build(&corpus)?)
}

fn read_queries(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading queries {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn search(corpus: &Path, model: &str, top_k: usize, params: &ModelParams, query: &str) -> Result<()> {
    let index = load_index(corpus)?;
    let ranker = Ranker::by_name(model, params)?;
    let ranked = ranker.rank(&index, &index.query(query), Some(top_k))?;

    println!("{} | query: {query}", ranker.scorer().name());
    if ranked.is_empty() {
        println!("  (no matching documents)");
    }
    for (rank, result) in ranked.iter().enumerate() {
        println!("  {:>2}. {:<12} {:.4}", rank + 1, result.id.as_str(), result.score);
    }
    Ok(())
}

fn bench(
    corpus: &Path,
    queries: &[String],
    benchmark: Benchmark,
    config: JudgeConfig,
    report_path: Option<&Path>,
) -> Result<()> {
    let index = load_index(corpus)?;
    let judge = LlmJudge::new(config)?;
    let report = benchmark.run(&index, queries, &judge)?;

    print_report(&report);

    if let Some(path) = report_path {
        write_report(&report, path)?;
        println!("\nReport written to {}", path.display());
    } else {
        info!("report disabled");
    }
    Ok(())
}

fn print_report(report: &BenchmarkReport) {
    println!("Judge: {}", report.judge.backend);
    for query in &report.per_query {
        println!("\nQuery: {}", query.query);
        for run in &query.models {
            println!("  {} | {} = {:.4}", run.model, report.metric, run.ndcg);
            if let Some(error) = &run.error {
                println!("    (query rejected: {error})");
            }
            for (rank, result) in run.ranked.iter().enumerate() {
                let grade = query.judgments.get(&result.id).copied().unwrap_or_default();
                println!(
                    "    {:>2}. {:<12} score={:.4} grade={}",
                    rank + 1,
                    result.id.as_str(),
                    result.score,
                    grade
                );
            }
        }
    }

    println!("\nMean {} over {} queries", report.metric, report.queries.len());
    for summary in &report.summary {
        println!("  {:<34} {:.4}", summary.model, summary.mean_ndcg);
    }
}
