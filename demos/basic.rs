use json_log_line::{JsonFormatter, Level, Record};

fn main() {
    let formatter = JsonFormatter::new();

    let record = Record::new(Level::Info, "Sign up").with_extra("referral_code", "52d6ce");
    println!("{}", formatter.format(&record).unwrap());

    let record = Record::new(Level::Error, "Payment was sent")
        .with_extra("amount", 0.00497265)
        .with_extra("ok", true);
    println!("{}", formatter.format(&record).unwrap());
}
