use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use triage::analysis::analyzer::Analyzer;
use triage::analysis::analyzer::message::MessageAnalyzer;
use triage::ml::vectorizer::{TfIdfConfig, TfIdfVectorizer};

fn sample_messages() -> Vec<String> {
    let templates = [
        "We urgently need clean drinking water and food supplies in the eastern district",
        "A large fire is spreading towards the central market please send help",
        "Several injured people require medical attention and medicine at the camp",
        "Families lost their houses in the floods and need shelter and blankets",
        "Roads are blocked by the earthquake and aid trucks cannot pass",
    ];
    (0..200)
        .map(|i| format!("{} report {i}", templates[i % templates.len()]))
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = MessageAnalyzer::new().unwrap();
    let message = "The floods destroyed the houses and the children need water";

    c.bench_function("analyze_message", |b| {
        b.iter(|| {
            let tokens: Vec<_> = analyzer.analyze(black_box(message)).unwrap().collect();
            black_box(tokens)
        })
    });
}

fn bench_vectorizer_fit(c: &mut Criterion) {
    let analyzer = MessageAnalyzer::new().unwrap();
    let messages = sample_messages();

    c.bench_function("tfidf_fit_200_messages", |b| {
        b.iter(|| {
            let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default());
            vectorizer.fit(&analyzer, black_box(&messages)).unwrap();
            black_box(vectorizer.vocabulary_size())
        })
    });
}

fn bench_vectorizer_transform(c: &mut Criterion) {
    let analyzer = MessageAnalyzer::new().unwrap();
    let messages = sample_messages();
    let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default());
    vectorizer.fit(&analyzer, &messages).unwrap();

    c.bench_function("tfidf_transform_message", |b| {
        b.iter(|| {
            let features = vectorizer
                .transform(&analyzer, black_box(&messages[0]))
                .unwrap();
            black_box(features)
        })
    });
}

criterion_group!(
    benches,
    bench_analyze,
    bench_vectorizer_fit,
    bench_vectorizer_transform
);
criterion_main!(benches);
