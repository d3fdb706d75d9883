//! Sample tables for tests and benchmarks.
//!
//! The CSV constants are small enough that expected statistics can be worked
//! out by hand; the comments next to each list the values tests rely on.

use crate::analyzers::inference::TypeClassifier;
use crate::core::{Dataset, Table};
use crate::error::Result;
use crate::sources::{parse_csv, CsvOptions};

/// Five regions with one extreme case count.
///
/// `cases` = [1, 2, 3, 4, 100]: mean 22, Q1 2, Q3 4, bounds [-1, 7], one outlier.
/// `region` = [A, A, B, C, A]: A 3, B 1, C 1.
pub const REGION_CASES_CSV: &str = "\
region,cases
A,1
A,2
B,3
C,4
A,100
";

/// Weekly disease reports with a missing count.
///
/// 2024-01-01 is a Monday. Week means of `cases`: 01-01 → 15 (2 rows),
/// 01-08 → 30 (1 row), 01-22 → 40, 02-05 → 50. Month means: Jan 25, Feb 50.
/// The overall mean of `cases` is 30.
pub const WEEKLY_CASES_CSV: &str = "\
week,state,cases,incidence
2024-01-01,Alabama,10,1.0
2024-01-03,Alaska,20,2.0
2024-01-08,Alabama,30,3.0
2024-01-10,Alaska,,
2024-01-22,Alabama,40,4.0
2024-02-05,Alaska,50,5.0
";

/// Yearly counts in the layout of the bundled contagious-disease files.
pub const DISEASE_CSV: &str = "\
disease,state,year,weeks_reporting,count,population
MEASLES,ALABAMA,1928,52,8843,2589923
MEASLES,ALABAMA,1929,49,2959,2619131
MEASLES,ALABAMA,1930,52,4156,2646248
MEASLES,ALASKA,1950,NA,NA,NA
MEASLES,ALASKA,1951,36,1074,136211
MEASLES,ARIZONA,1928,51,383,431264
MEASLES,ARIZONA,1929,50,1213,443542
MEASLES,ARIZONA,1930,52,427,445813
";

/// A table with every column type and some missing cells.
pub const MIXED_TYPES_CSV: &str = "\
id,name,signup,score,notes
1,Alice,2023-03-01,88.5,
2,Bob,2023-03-02,NA,late
3,,2023-03-04,92.0,
4,Dana,NA,75.25,n/a
";

/// Parses and classifies `csv` into a loaded dataset named `test.csv`.
///
/// Panics on malformed input; use [`try_dataset_from_csv`] to observe errors.
pub fn dataset_from_csv(csv: &str) -> Dataset {
    match try_dataset_from_csv(csv) {
        Ok(dataset) => dataset,
        Err(e) => panic!("fixture CSV failed to load: {e}"),
    }
}

/// Fallible form of [`dataset_from_csv`].
pub fn try_dataset_from_csv(csv: &str) -> Result<Dataset> {
    let raw = parse_csv(csv.as_bytes(), &CsvOptions::default())?;
    let classifier = TypeClassifier::new();
    let classification = classifier.classify(&raw)?;
    let table = Table::from_raw("test.csv", &raw, &classification, &classifier)?;
    Dataset::new(table, classification)
}

/// A wide synthetic CSV for benchmarks: `rows` rows of a date, a category and two metrics.
pub fn synthetic_csv(rows: usize) -> String {
    let mut csv = String::from("date,category,value,ratio\n");
    for i in 0..rows {
        let day = i % 28 + 1;
        let month = (i / 28) % 12 + 1;
        let category = ["north", "south", "east", "west"][i % 4];
        csv.push_str(&format!(
            "2020-{month:02}-{day:02},{category},{},{:.3}\n",
            (i * 7919) % 1000,
            (i % 97) as f64 / 97.0
        ));
    }
    csv
}
