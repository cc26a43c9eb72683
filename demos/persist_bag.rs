//! Fill a bag, draw from it, save it to disk and load it back.
//!
//! The file holds the same bag twice, back to back, to show that each `read`
//! stops at its own terminator.

use fukuro::{RecordFormat, WeightedBag};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::fs::File;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut bag = WeightedBag::new();
    for (colour, n) in [("red", 10), ("blue", 3), ("yellow", 5)] {
        for _ in 0..n {
            bag.add(colour.to_string());
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let draws: Vec<&String> = (0..8).filter_map(|_| bag.pull_with_rng(&mut rng)).collect();
    println!("total weight: {}", bag.count_contents());
    println!("eight draws:  {draws:?}");

    let path = std::env::temp_dir().join("fukuro-demo.txt");

    let mut file = File::create(&path).await?;
    bag.write(&mut file, RecordFormat::Lines).await?;
    bag.write(&mut file, RecordFormat::Lines).await?;
    drop(file);

    let mut reader = BufReader::new(File::open(&path).await?);
    for copy in 1..=2 {
        let loaded =
            WeightedBag::read_from(&mut reader, RecordFormat::Lines, |k: &str| {
                Ok::<_, std::convert::Infallible>(k.to_owned())
            })
            .await?;
        println!("copy {copy} equal to original: {}", loaded == bag);
    }

    tokio::fs::remove_file(&path).await?;
    Ok(())
}
