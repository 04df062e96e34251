//! Prompt composition.
//!
//! Pure functions of (subject, roster). The subject and every thinker name
//! appear exactly once in each composed text.

use crate::analysis::roster::Roster;

/// The two texts sent to the generator for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// System instruction: role, decomposition, tone, language, output format.
    pub instruction: String,
    /// User turn restating the subject and the thinkers.
    pub query: String,
}

pub fn compose(subject: &str, roster: &Roster) -> Prompt {
    Prompt {
        instruction: instruction_text(subject, roster),
        query: query_text(subject, roster),
    }
}

fn instruction_text(subject: &str, roster: &Roster) -> String {
    let mut text = String::new();

    text.push_str("Tu es un spécialiste de l'analyse sociologique et philosophique. ");
    text.push_str(&format!(
        "Ton rôle est de décortiquer le sujet proposé par l'utilisateur (qui est: \"{}\") \
         à travers le prisme des grands penseurs suivants: {}. ",
        subject,
        roster.joined()
    ));
    text.push_str(
        "Pour chaque penseur, tu dois fournir une analyse structurée, séparant : \
         1) l'approche générale du penseur sur le thème large associé au sujet \
         (ex: pour 'solitude numérique', le thème large est 'isolement' ou 'relation humaine'), et \
         2) l'application ou l'interprétation spécifique de ses idées au sujet exact proposé par l'utilisateur. ",
    );
    text.push_str("Le ton doit être académique, rigoureux, et pédagogique. ");
    text.push_str("Rédige toute l'analyse en français. ");
    text.push_str("Réponds UNIQUEMENT en utilisant la structure JSON fournie ci-dessous.");

    text
}

fn query_text(subject: &str, roster: &Roster) -> String {
    format!(
        "Analyse le sujet \"{}\" en appliquant les idées des penseurs suivants: {}.",
        subject,
        roster.joined()
    )
}
