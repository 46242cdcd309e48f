// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for banner classification, model extraction, and
// record deduplication in the printscout-discovery crate.

use std::net::{IpAddr, Ipv4Addr};

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use printscout_core::types::{Ipv4Cidr, PrinterRecord, PrinterStatus, RecordSource};
use printscout_discovery::dedup::dedup;
use printscout_discovery::heuristics::DeviceClassifier;

// ---------------------------------------------------------------------------
// Helper: a realistic embedded web server landing page
// ---------------------------------------------------------------------------

fn landing_page(title: &str) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head>");
    html.push_str("<meta charset=\"utf-8\"><link rel=\"stylesheet\" href=\"/css/main.css\">");
    html.push_str(&format!("<title>{title}</title></head><body>"));
    for i in 0..200 {
        html.push_str(&format!("<div class=\"row\" id=\"r{i}\">status ok</div>"));
    }
    html.push_str("</body></html>");
    html
}

fn bench_identify(c: &mut Criterion) {
    let classifier = DeviceClassifier::default();
    let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5));
    let canon = landing_page("Canon PIXMA TS3400 series");
    let router = landing_page("Home Router Setup");

    c.bench_function("identify (Canon banner)", |b| {
        b.iter(|| {
            let id = classifier.identify(black_box(ip), black_box(&canon));
            assert!(id.is_some());
        });
    });

    c.bench_function("identify (foreign banner)", |b| {
        b.iter(|| {
            black_box(classifier.identify(black_box(ip), black_box(&router)));
        });
    });
}

fn bench_extract_model(c: &mut Criterion) {
    let classifier = DeviceClassifier::default();
    let names = [
        "Canon PIXMA TS3400 series",
        "Canon imageCLASS MF743Cdw",
        "Canon MAXIFY MB2720",
        "Canon SELPHY CP1500",
    ];

    c.bench_function("extract_model (4 names)", |b| {
        b.iter(|| {
            for name in &names {
                black_box(classifier.extract_model(black_box(name)));
            }
        });
    });
}

fn bench_dedup(c: &mut Criterion) {
    let cidr: Ipv4Cidr = "10.0.0.0/24".parse().expect("valid CIDR");
    // Every address twice: once from the OS list, once from the sweep.
    let records: Vec<PrinterRecord> = [RecordSource::System, RecordSource::NetworkScan]
        .into_iter()
        .flat_map(|source| {
            cidr.addresses().map(move |ip| {
                PrinterRecord::new(
                    format!("ipp://{ip}:631/ipp/print"),
                    format!("Canon at {ip}"),
                    PrinterStatus::Available,
                    "Canon Printer",
                    source,
                )
            })
        })
        .collect();

    c.bench_function("dedup (512 records, 50% duplicates)", |b| {
        b.iter(|| {
            let unique = dedup(black_box(records.clone()));
            assert_eq!(unique.len(), 256);
        });
    });
}

criterion_group!(benches, bench_identify, bench_extract_model, bench_dedup);
criterion_main!(benches);
