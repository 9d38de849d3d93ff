extern crate engine;

use engine::storage::{Row, Table};
use std::path::PathBuf;

fn main() {
    divan::main();
}

fn table(rows: u64) -> Table {
    let columns = vec![String::from("name"), String::from("mark")];
    let mut table = Table::new("marks", PathBuf::from("marks.tab"), &columns);

    for i in 0..rows {
        table.push_row(Row::new(i + 1, vec![format!("student{i}"), (i % 100).to_string()]));
    }

    table
}

#[divan::bench(args = [1, 16, 256, 4096])]
fn serialise(bencher: divan::Bencher, rows: u64) {
    let table = table(rows);

    bencher.bench_local(|| table.serialise());
}

#[divan::bench(args = [1, 16, 256, 4096])]
fn deserialise(bencher: divan::Bencher, rows: u64) {
    let contents = table(rows).serialise();

    bencher.bench_local(|| Table::deserialise("marks", PathBuf::from("marks.tab"), &contents));
}
