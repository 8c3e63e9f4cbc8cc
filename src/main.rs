use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use augur::data::corpus::Corpus;
use augur::diagnostic;
use augur::inference::beam::{decode, Continuation, DecodeConfig};
use augur::inference::oracle::{FrequencyOracle, Oracle, RnnOracle};
use augur::inference::{decode_many, DecodeError};
use augur::model::rnn::CharRnnConfig;
use augur::model::vocab::Vocabulary;
use augur::report::{self, DecodeReport};
use augur::training::supervised::{cosine_lr, create_optimizer, train_epoch, TrainConfig};

use burn::backend::{Autodiff, NdArray, Wgpu};

#[derive(Parser)]
#[command(
    name = "augur",
    version,
    about = "Beam-search decoding of probable continuations from a next-symbol oracle"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the alphabet and fingerprint of a corpus
    Vocab {
        /// Corpus text file
        corpus: PathBuf,
    },
    /// Train a next-symbol model on a corpus and decode continuations
    Sample {
        /// Corpus text file
        corpus: PathBuf,
        /// Seed text to extend (repeat for several seeds)
        #[arg(short, long, required = true)]
        seed: Vec<String>,
        /// Beams kept after each step
        #[arg(long, default_value_t = 8)]
        width: usize,
        /// Symbols to generate
        #[arg(long, default_value_t = 32)]
        horizon: usize,
        /// Training epochs
        #[arg(long, default_value_t = 20)]
        epochs: usize,
        /// Training window length
        #[arg(long, default_value_t = 32)]
        window: usize,
        /// Hidden state size
        #[arg(long, default_value_t = 128)]
        hidden: usize,
        /// Decode with corpus unigram frequencies instead of a trained model
        #[arg(long)]
        baseline: bool,
        /// Use GPU acceleration (default: CPU)
        #[arg(long)]
        gpu: bool,
        /// Save a JSON report of the ranked continuations
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Vocab { corpus } => cmd_vocab(&corpus),
        Command::Sample {
            corpus,
            seed,
            width,
            horizon,
            epochs,
            window,
            hidden,
            baseline,
            gpu,
            json,
        } => cmd_sample(
            &corpus, seed, width, horizon, epochs, window, hidden, baseline, gpu, json,
        ),
    }
}

fn load_corpus(path: &Path) -> Corpus {
    match Corpus::load(path) {
        Ok(corpus) => corpus,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn cmd_vocab(path: &Path) {
    let corpus = load_corpus(path);
    let vocab = Vocabulary::from_text(corpus.text());

    println!("corpus:      {}", path.display());
    println!("fingerprint: {}", corpus.fingerprint());
    println!("symbols:     {}", corpus.len());
    println!("alphabet:    {} distinct", vocab.size());
    let alphabet: String = vocab
        .symbols()
        .iter()
        .flat_map(|c| c.escape_default())
        .collect();
    println!("  {}", alphabet);
}

fn cmd_sample(
    path: &Path,
    seeds: Vec<String>,
    width: usize,
    horizon: usize,
    epochs: usize,
    window: usize,
    hidden: usize,
    baseline: bool,
    gpu: bool,
    json: Option<PathBuf>,
) {
    let corpus = load_corpus(path);
    let vocab = Vocabulary::from_text(corpus.text());
    if vocab.is_empty() {
        eprintln!("error: corpus '{}' is empty", path.display());
        process::exit(1);
    }

    eprintln!(
        "corpus {} ({} symbols, alphabet {})",
        corpus.fingerprint(),
        corpus.len(),
        vocab.size()
    );

    let config = DecodeConfig {
        beam_width: width,
        horizon,
    };

    if baseline {
        let oracle = FrequencyOracle::from_corpus(&corpus, &vocab);
        eprintln!("baseline oracle: corpus unigram frequencies");
        run_decode(&seeds, &config, &vocab, &oracle, &corpus.fingerprint(), json);
        return;
    }

    let train_config = TrainConfig {
        epochs,
        window,
        ..TrainConfig::default()
    };

    if gpu {
        let device = burn::backend::wgpu::WgpuDevice::default();
        run_trained::<Autodiff<Wgpu>>(
            &corpus,
            &vocab,
            &seeds,
            &config,
            &train_config,
            hidden,
            json,
            &device,
        );
    } else {
        let device = Default::default();
        run_trained::<Autodiff<NdArray>>(
            &corpus,
            &vocab,
            &seeds,
            &config,
            &train_config,
            hidden,
            json,
            &device,
        );
    }
}

/// Train in memory, then decode every seed with the trained oracle.
fn run_trained<B: burn::tensor::backend::AutodiffBackend>(
    corpus: &Corpus,
    vocab: &Vocabulary,
    seeds: &[String],
    config: &DecodeConfig,
    train_config: &TrainConfig,
    hidden: usize,
    json: Option<PathBuf>,
    device: &B::Device,
) {
    let windows = corpus.index_windows(vocab, train_config.window, train_config.stride);
    if windows.is_empty() {
        eprintln!(
            "error: corpus of {} symbols is too short for window length {}",
            corpus.len(),
            train_config.window
        );
        process::exit(1);
    }

    eprintln!(
        "training: {} windows, {} epochs, hidden {}",
        windows.len(),
        train_config.epochs,
        hidden
    );

    let mut model = CharRnnConfig::new(vocab.size())
        .with_d_hidden(hidden)
        .init::<B>(device);
    let mut optimizer = create_optimizer::<B>(train_config);
    let start = std::time::Instant::now();

    for epoch in 0..train_config.epochs {
        let lr = cosine_lr(train_config, epoch, train_config.epochs);
        let (next, result) = train_epoch(
            model,
            &windows,
            vocab.size(),
            train_config.batch_size,
            &mut optimizer,
            lr,
            device,
        );
        model = next;
        eprintln!(
            "[{}/{}] loss {:.4}",
            epoch + 1,
            train_config.epochs,
            result.avg_loss
        );
    }
    eprintln!("trained in {:.1}s", start.elapsed().as_secs_f64());

    let oracle = RnnOracle::new(model, device.clone());
    run_decode(seeds, config, vocab, &oracle, &corpus.fingerprint(), json);
}

/// Decode all seeds, print ranked continuations, optionally save a report.
fn run_decode<O: Oracle + Sync + ?Sized>(
    seeds: &[String],
    config: &DecodeConfig,
    vocab: &Vocabulary,
    oracle: &O,
    fingerprint: &str,
    json: Option<PathBuf>,
) {
    let results = if seeds.len() > 1 {
        decode_many(seeds, config, vocab, oracle)
    } else {
        vec![decode(&seeds[0], config, vocab, oracle)]
    };

    let mut reports = Vec::new();
    let mut failed = false;

    for (seed, result) in seeds.iter().zip(results) {
        match result {
            Ok(ranked) => {
                if seeds.len() > 1 {
                    eprintln!();
                    eprintln!("seed '{}':", seed);
                }
                print_ranked(&ranked);
                reports.push(DecodeReport {
                    corpus_fingerprint: fingerprint.to_string(),
                    seed: seed.clone(),
                    beam_width: config.beam_width,
                    horizon: config.horizon,
                    results: ranked,
                });
            }
            Err(DecodeError::UnknownSymbol { symbol, position }) => {
                diagnostic::unknown_symbol(seed, symbol, position).render("<seed>", seed);
                failed = true;
            }
            Err(e) => {
                eprintln!("error: {}", e);
                failed = true;
            }
        }
    }

    if let Some(path) = json {
        if let Err(e) = report::save_json(&reports, &path) {
            eprintln!("error: {}", e);
            process::exit(1);
        }
        eprintln!("report -> {}", path.display());
    }

    if failed {
        process::exit(1);
    }
}

/// One continuation per line, best first. Symbols that would break the
/// line (the corpus may contain newlines) are printed escaped.
fn print_ranked(ranked: &[Continuation]) {
    for c in ranked {
        let text: String = c.text.chars().flat_map(|ch| ch.escape_default()).collect();
        println!("{}  {:.4}", text, c.log_probability);
    }
}
