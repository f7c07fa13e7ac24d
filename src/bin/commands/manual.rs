use colored::*;
use sqlcheck::ScenarioGroup;

struct Concept {
    name: &'static str,
    description: &'static str,
    reference: &'static str,
}

const CONCEPTS: &[Concept] = &[
    Concept {
        name: "Referential integrity",
        description: "Keeps relationships between tables consistent: every value in a referencing column must match an existing row in the referenced table.",
        reference: "Date, C. J. (2003). An Introduction to Database Systems (8th ed.). Addison-Wesley. p. 328-336.",
    },
    Concept {
        name: "View",
        description: "A virtual table defined by a SQL query. It stores no rows itself and is used to simplify queries, control access and present data.",
        reference: "Elmasri, R., & Navathe, S. B. (2016). Fundamentals of Database Systems (7th ed.). Pearson. p. 201-210.",
    },
    Concept {
        name: "Trigger",
        description: "A procedure run automatically when a specific event happens on a table, used for integrity, auditing and automation.",
        reference: "Coronel, C., & Morris, S. (2018). Database Systems: Design, Implementation, & Management (13th ed.). Cengage Learning. p. 412-425.",
    },
    Concept {
        name: "Join",
        description: "Combines columns from several tables based on a related field. INNER, LEFT, RIGHT and FULL joins differ in which unmatched rows they keep.",
        reference: "Garcia-Molina, H., Ullman, J. D., & Widom, J. (2014). Database Systems: The Complete Book (2nd ed.). Pearson. p. 155-172.",
    },
    Concept {
        name: "Performance testing",
        description: "Measures response times and resource use under different loads to find bottlenecks, such as a missing index or per-row commits.",
        reference: "Shasha, D., & Bonnet, P. (2002). Database Tuning: Principles, Experiments, and Troubleshooting Techniques. Morgan Kaufmann. p. 45-60.",
    },
];

pub fn run() {
    let rule = "=".repeat(60);
    println!("{}", rule.cyan());
    println!(
        "{}",
        format!("{:^60}", "DATABASE TEST SYSTEM MANUAL").yellow()
    );
    println!("{}", rule.cyan());

    println!("\n{}", "OVERVIEW:".green());
    println!("This system runs automated scenarios against a SQLite database,");
    println!("covering several aspects of relational database operations.");

    println!("\n{}", "AVAILABLE TEST GROUPS:".green());
    for group in ScenarioGroup::all() {
        println!("{}", format!("{}. {}", group.menu_key(), group.title()).yellow());
        println!("  {}", group.summary());
    }

    println!("\n{}", "KEY CONCEPTS:".green());
    for concept in CONCEPTS {
        println!("{}", concept.name.yellow());
        println!("  {}", concept.description);
        println!("  {} {}", "Reference:".cyan(), concept.reference);
    }

    println!("\n{}", "HOW TO USE:".green());
    println!("1. Pick an option from the main menu by typing its key");
    println!("2. Follow the steps printed while each scenario runs");
    println!("3. Review the results to see how the database behaves");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_concept_cites_a_reference() {
        for concept in CONCEPTS {
            assert!(!concept.description.is_empty(), "{}", concept.name);
            assert!(concept.reference.contains("). "), "{}", concept.name);
        }
        assert!(CONCEPTS
            .iter()
            .any(|c| c.name == "View" && c.reference.starts_with("Elmasri")));
    }
}
