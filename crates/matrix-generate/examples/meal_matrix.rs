use matrix_generate::{PanicReporter, dims, generate};
use serde::{Deserialize, Serialize};

// Everyone eats everything: three people times four foods.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Meal {
    who: String,
    food: String,
}

fn main() {
    let cases = generate(
        &PanicReporter,
        &Meal::default(),
        &dims![
            ["Priyanka", "Pedro", "Paul"],
            ["Pizza", "Spaghetti", "Bananas", "Sushi"]
        ],
    )
    .indexed();

    for case in cases {
        println!("{}: {} eats {}", case.name, case.record.who, case.record.food);
    }
}
