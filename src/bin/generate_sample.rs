use anyhow::{Context, Result};
use serde_json::{Map, Number, Value as JsonValue};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Per-species (mean, std) for sepal_length and petal_length.
const SPECIES: [(&str, (f64, f64), (f64, f64)); 3] = [
    ("setosa", (5.0, 0.35), (1.46, 0.17)),
    ("versicolor", (5.9, 0.51), (4.26, 0.47)),
    ("virginica", (6.6, 0.63), (5.55, 0.55)),
];

fn write_iris_json(path: &str, rng: &mut SimpleRng) -> Result<usize> {
    let mut rows = Vec::new();
    for (species, sepal, petal) in SPECIES {
        for _ in 0..50 {
            let mut obj = Map::new();
            obj.insert("species".into(), JsonValue::String(species.to_string()));
            obj.insert(
                "sepal_length".into(),
                json_f64((rng.gauss(sepal.0, sepal.1) * 10.0).round() / 10.0),
            );
            obj.insert(
                "petal_length".into(),
                json_f64((rng.gauss(petal.0, petal.1) * 10.0).round() / 10.0),
            );
            rows.push(JsonValue::Object(obj));
        }
    }
    let n = rows.len();
    let text = serde_json::to_string_pretty(&JsonValue::Array(rows))?;
    std::fs::write(path, text).with_context(|| format!("writing {path}"))?;
    Ok(n)
}

fn json_f64(v: f64) -> JsonValue {
    // Falls back to null for non-finite values; gauss() never produces
    // them but serde_json requires the check.
    Number::from_f64(v).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

fn write_titanic_csv(path: &str, rng: &mut SimpleRng) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["pclass", "survived", "sex", "age", "fare"])?;

    let classes: [(i64, f64, f64); 3] = [(1, 84.0, 0.62), (2, 21.0, 0.47), (3, 13.0, 0.24)];
    let sexes = ["male", "female"];

    let mut n = 0;
    for (pclass, base_fare, survival_rate) in classes {
        for _ in 0..100 {
            let survived = i64::from(rng.next_f64() < survival_rate);
            let sex = rng.pick(&sexes);
            let age = (rng.gauss(30.0, 12.0).clamp(1.0, 80.0)).round();
            let fare = (rng.gauss(base_fare, base_fare * 0.4).max(0.0) * 100.0).round() / 100.0;
            // A sprinkle of missing ages, like the real manifest.
            let age_cell = if rng.next_f64() < 0.1 {
                String::new()
            } else {
                format!("{age}")
            };
            writer.write_record([
                pclass.to_string(),
                survived.to_string(),
                sex.to_string(),
                age_cell,
                format!("{fare}"),
            ])?;
            n += 1;
        }
    }
    writer.flush().context("flushing CSV")?;
    Ok(n)
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let iris_rows = write_iris_json("iris_sample.json", &mut rng)?;
    log::info!("wrote {iris_rows} rows to iris_sample.json");

    let titanic_rows = write_titanic_csv("titanic_sample.csv", &mut rng)?;
    log::info!("wrote {titanic_rows} rows to titanic_sample.csv");

    // Sanity: both files should load back through the pipeline.
    for path in ["iris_sample.json", "titanic_sample.csv"] {
        let ds = rusty_dash::data::loader::load_file(std::path::Path::new(path))?;
        println!(
            "{path}: {} records, columns {:?}",
            ds.len(),
            ds.column_names
        );
    }

    Ok(())
}
