//! Benchmarks for the validation pipeline
//!
//! Measures single-document validation by stage and batch throughput as the
//! worker count grows.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ddexcheck_core::{validate_batch, DdexDocument, DocumentSource, PipelineConfig, RuleContext, RuleEngine, Validator};

/// A namespaced ERN 3.8.2 release with `tracks` sound recordings
fn create_release(tracks: usize) -> String {
    let mut resources = String::new();
    let mut references = String::new();
    for i in 0..tracks {
        resources.push_str(&format!(
            "<SoundRecording><ResourceReference>A{i}</ResourceReference>\
             <SoundRecordingId><ISRC>USRC1{i:07}</ISRC></SoundRecordingId>\
             <Duration>PT3M{}S</Duration><LanguageOfPerformance>en</LanguageOfPerformance>\
             </SoundRecording>",
            i % 60
        ));
        references.push_str(&format!("<ReleaseResourceReference>A{i}</ReleaseResourceReference>"));
    }

    format!(
        r#"<ern:NewReleaseMessage xmlns:ern="http://ddex.net/xml/ern/382" MessageSchemaVersionId="ern/382">
  <MessageHeader>
    <MessageThreadId>T1</MessageThreadId><MessageId>M1</MessageId>
    <MessageSender><PartyId>PADPIDA0000000001</PartyId></MessageSender>
    <MessageRecipient><PartyId>PADPIDA0000000002</PartyId></MessageRecipient>
    <MessageCreatedDateTime>2024-01-15T10:00:00Z</MessageCreatedDateTime>
  </MessageHeader>
  <ResourceList>{resources}</ResourceList>
  <ReleaseList><Release><ReleaseReference>R0</ReleaseReference>{references}<ReleaseDate>2024-02-01</ReleaseDate></Release></ReleaseList>
  <DealList><ReleaseDeal><DealReleaseReference>R0</DealReleaseReference><Deal><DealTerms>
    <CommercialModelType>SubscriptionModel</CommercialModelType><TerritoryCode>Worldwide</TerritoryCode>
    <ValidityPeriod><StartDate>2024-02-01</StartDate></ValidityPeriod>
  </DealTerms></Deal></ReleaseDeal></DealList>
</ern:NewReleaseMessage>"#
    )
}

fn bench_single_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_document");
    let validator = Validator::from_config(PipelineConfig::default()).unwrap();

    for tracks in [1usize, 20, 200] {
        let xml = create_release(tracks);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::new("full_pipeline", tracks), &xml, |b, xml| {
            b.iter(|| validator.validate_str("bench.xml", black_box(xml)).unwrap())
        });
    }
    group.finish();
}

fn bench_rule_engine(c: &mut Criterion) {
    let document = DdexDocument::parse(&create_release(200)).unwrap();
    let engine = RuleEngine::new();
    let context = RuleContext { strict: true };

    c.bench_function("rule_engine_200_tracks", |b| {
        b.iter(|| engine.evaluate(black_box(&document), &context))
    });
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);
    let sources: Vec<DocumentSource> = (0..64)
        .map(|i| DocumentSource::from_text(format!("doc-{i}.xml"), create_release(20)))
        .collect();

    for workers in [1usize, 2, 4, 8] {
        let validator = Validator::from_config(PipelineConfig::default().with_workers(workers)).unwrap();
        group.throughput(Throughput::Elements(sources.len() as u64));
        group.bench_with_input(BenchmarkId::new("workers", workers), &sources, |b, sources| {
            b.iter(|| validate_batch(&validator, black_box(sources)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_document, bench_rule_engine, bench_batch);
criterion_main!(benches);
