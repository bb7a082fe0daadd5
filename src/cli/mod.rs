use std::net::SocketAddr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::application::LedgerService;
use crate::config::{DEFAULT_BIND_ADDR, DEFAULT_DATABASE, DEFAULT_LOG_LEVEL, ServerConfig};
use crate::domain::{Amount, BatchId, NewPayment, StudentId};
use crate::{http, telemetry};

/// Chinmudra - batch, student and payment tracking
#[derive(Parser)]
#[command(name = "chinmudra")]
#[command(about = "Track batches, enrolled students and their payments")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, global = true, env = "CHINMUDRA_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "CHINMUDRA_LOG", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and its schema
    Init,

    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "CHINMUDRA_BIND", default_value = DEFAULT_BIND_ADDR)]
        bind: SocketAddr,
    },

    /// Batch management commands
    #[command(subcommand)]
    Batch(BatchCommands),

    /// Student management commands
    #[command(subcommand)]
    Student(StudentCommands),

    /// Record a payment for a student
    Pay {
        /// Student ID
        student_id: StudentId,

        /// Amount paid
        amount: Amount,

        /// External transaction reference (bank, UPI, ...)
        #[arg(short, long)]
        transaction_id: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BatchCommands {
    /// Create a new batch
    Add {
        /// Batch name (must be unique)
        name: String,
    },

    /// List all batches
    List,

    /// List the students of a batch
    Students {
        /// Batch ID
        id: BatchId,
    },
}

#[derive(Subcommand)]
pub enum StudentCommands {
    /// Enroll a student in a batch
    Add {
        /// Student name
        name: String,

        /// Batch ID to enroll into
        #[arg(short, long)]
        batch: BatchId,
    },

    /// Show a student's payment summary
    Show {
        /// Student ID
        id: StudentId,
    },

    /// List a student's payments
    Payments {
        /// Student ID
        id: StudentId,
    },
}

impl Cli {
    /// Resolve the runtime configuration from flags and environment.
    pub fn config(&self) -> ServerConfig {
        let mut config = ServerConfig {
            database: self.database.clone(),
            log_level: self.log_level.clone(),
            ..ServerConfig::default()
        };
        if let Commands::Serve { bind } = &self.command {
            config.bind_addr = *bind;
        }
        config
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();
        telemetry::init_tracing(&config.log_level);

        let service = LedgerService::init(&config.database).await?;

        match self.command {
            Commands::Init => {
                println!("Database initialized: {}", config.database);
            }

            Commands::Serve { .. } => {
                http::serve(&config, service).await?;
            }

            Commands::Batch(batch_cmd) => {
                run_batch_command(&service, batch_cmd).await?;
            }

            Commands::Student(student_cmd) => {
                run_student_command(&service, student_cmd).await?;
            }

            Commands::Pay {
                student_id,
                amount,
                transaction_id,
            } => {
                let mut payment = NewPayment::new(student_id, amount);
                if let Some(txn) = transaction_id {
                    payment = payment.with_transaction_id(txn);
                }

                let payment = service.create_payment(payment).await?;
                println!(
                    "Recorded payment #{}: {} for student {} on {}",
                    payment.id,
                    payment.amount,
                    payment.student_id,
                    payment.date.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        Ok(())
    }
}

async fn run_batch_command(service: &LedgerService, cmd: BatchCommands) -> Result<()> {
    match cmd {
        BatchCommands::Add { name } => {
            let batch = service.create_batch(name).await?;
            println!("Created batch: {} (id {})", batch.name, batch.id);
        }

        BatchCommands::List => {
            let batches = service.list_batches().await?;
            if batches.is_empty() {
                println!("No batches found.");
            } else {
                println!("{:<6} {:<24} {:>8}", "ID", "NAME", "STUDENTS");
                println!("{}", "-".repeat(40));
                for batch in batches {
                    println!(
                        "{:<6} {:<24} {:>8}",
                        batch.id, batch.name, batch.total_students
                    );
                }
            }
        }

        BatchCommands::Students { id } => {
            let batch = service.get_batch(id).await?;
            let students = service.list_students_for_batch(id).await?;
            println!("Batch: {} ({} students)", batch.name, batch.total_students);
            if batch.is_empty() {
                println!("No students enrolled.");
            } else {
                println!("{:<6} {:<24} {:<8} {:>10}", "ID", "NAME", "STATUS", "AMOUNT");
                println!("{}", "-".repeat(51));
                for student in students {
                    println!(
                        "{:<6} {:<24} {:<8} {:>10}",
                        student.id, student.name, student.payment_status, student.amount
                    );
                }
            }
        }
    }

    Ok(())
}

async fn run_student_command(service: &LedgerService, cmd: StudentCommands) -> Result<()> {
    match cmd {
        StudentCommands::Add { name, batch } => {
            let student = service.create_student(name, batch).await?;
            println!(
                "Enrolled student: {} (id {}) in batch {}",
                student.name, student.id, student.batch_id
            );
        }

        StudentCommands::Show { id } => {
            let student = service.get_student(id).await?;
            println!("Student: {}", student.name);
            println!("  ID:           {}", student.id);
            println!("  Batch:        {}", student.batch_id);
            println!("  Status:       {}", student.payment_status);
            println!("  Last amount:  {}", student.amount);
            match student.last_payment_date {
                Some(date) => println!("  Last payment: {}", date.format("%Y-%m-%d %H:%M:%S")),
                None => println!("  Last payment: never"),
            }
        }

        StudentCommands::Payments { id } => {
            let payments = service.list_payments_for_student(id).await?;
            if payments.is_empty() {
                println!("No payments recorded.");
            } else {
                println!("{:<6} {:<20} {:>10} {}", "ID", "DATE", "AMOUNT", "TRANSACTION");
                println!("{}", "-".repeat(52));
                for payment in payments {
                    println!(
                        "{:<6} {:<20} {:>10} {}",
                        payment.id,
                        payment.date.format("%Y-%m-%d %H:%M:%S"),
                        payment.amount,
                        payment.transaction_id.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    Ok(())
}
