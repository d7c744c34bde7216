use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use log::info;

mod blockchain;

use blockchain::storage;
use blockchain::{Block, Blockchain, Transaction, MINT_ACCOUNT};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let name = prompt(
        &mut input,
        "Enter the name of the blockchain file (without extension): ",
    )?;
    let path = format!("{}.txt", name.trim());

    let mut chain = match storage::read_chain(&path) {
        Ok(chain) => chain,
        Err(err) => {
            eprintln!("Could not load {}: {}", path, err);
            return Ok(());
        }
    };
    info!("loaded chain of {} blocks from {}", chain.len(), path);

    if let Err(violation) = chain.validate() {
        eprintln!("This blockchain is invalid: {}", violation);
        return Ok(());
    }
    println!("Blockchain is valid");

    while ask_yes(
        &mut input,
        "Do you want to add another transaction? Enter yes to continue: ",
    )? {
        let transaction = read_transaction(&mut input, &chain)?;

        println!("\nPlease wait while a nonce is found...");
        let block = Block::sealed(
            chain.len() as u64,
            transaction,
            chain.last_hash().to_string(),
        );
        let tries = block.tries;
        chain.record_tries(tries);
        chain.add(block);
        println!("Nonce took {} hash trials to find\n", tries);
    }

    print_session_stats(&chain);

    storage::write_chain(&chain, &path).with_context(|| format!("failed to write {}", path))?;
    println!("Chain written to {}", path);

    Ok(())
}

/// Reads a complete transaction from the session, re-prompting until every
/// field is acceptable: neither party may be the mint account, and the
/// amount must be a positive integer the sender can cover.
fn read_transaction(input: &mut impl BufRead, chain: &Blockchain) -> Result<Transaction> {
    println!("New blockchain entry:");
    let sender = read_party(input, "Enter the sender: ")?;
    let receiver = read_party(input, "Enter the receiver: ")?;

    let amount = loop {
        let raw = prompt(input, "Enter the amount: ")?;
        match raw.trim().parse::<i64>() {
            Ok(amount) if amount <= 0 => {
                println!("Amount not valid, enter a new amount");
            }
            Ok(amount) if amount > chain.get_balance(&sender) => {
                println!("Sender does not have enough balance, enter a new amount");
            }
            Ok(amount) => break amount,
            Err(_) => println!("That is not a number, enter an integer amount"),
        }
    };

    Ok(Transaction::new(sender, receiver, amount))
}

/// Reads a non-empty account name that is not the mint sentinel.
fn read_party(input: &mut impl BufRead, label: &str) -> Result<String> {
    loop {
        let name = prompt(input, label)?.trim().to_string();
        if name.is_empty() {
            println!("Name must not be empty, enter a name");
        } else if name == MINT_ACCOUNT {
            println!("That is not a valid party, enter a different name");
        } else {
            return Ok(name);
        }
    }
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed before the session finished");
    }
    Ok(line)
}

fn ask_yes(input: &mut impl BufRead, label: &str) -> Result<bool> {
    Ok(prompt(input, label)?.trim() == "yes")
}

/// Prints min/max/average trial counts for the blocks mined this session.
fn print_session_stats(chain: &Blockchain) {
    let stats = chain.mining_stats();
    if stats.is_empty() {
        println!("No transactions added, no stats available");
        return;
    }

    let min = stats.iter().copied().min().unwrap_or(0);
    let max = stats.iter().copied().max().unwrap_or(0);
    let sum: u64 = stats.iter().sum();
    let average = sum / stats.len() as u64;

    println!("\nStats:\nMin: {}\nMax: {}\nAverage: {}", min, max, average);

    let first_mined = chain.len() - stats.len();
    for (i, tries) in stats.iter().enumerate() {
        println!(
            "Block at index {} took {} hash trials",
            first_mined + i,
            tries
        );
    }
}
