//! Game service: routes chat events into per-group round state, applies the
//! scoring policy, and drives timer-based round rotation.
//!
//! All state transitions for one group serialize on that group's mutex, so a
//! user message and a timer fire can never interleave on half-updated round
//! state. Distinct groups share nothing but the ledger.

use crate::domain::guess::{self, BONUS_KEYWORD};
use crate::domain::{
    ChatEvent, Command, Evaluation, PointValues, RoundState, SelectionMode, UserRef, WordCatalog,
    WordEntry,
};
use crate::ports::NotifierPort;
use crate::usecases::ledger::ScoreLedger;
use crate::usecases::scheduler::RoundScheduler;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Deployment knobs for the game loop.
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub selection: SelectionMode,
    pub points: PointValues,
    /// Moderator user id as an exact string match. `None` lets anyone
    /// moderate.
    pub admin_id: Option<String>,
    /// Auto-rotation period.
    pub round_interval: Duration,
    /// Pause between the expiry notice and the next word. The round is idle
    /// for the duration, so no guesses land on a word about to change.
    pub rotation_grace: Duration,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            selection: SelectionMode::Sequential,
            points: PointValues::default(),
            admin_id: None,
            round_interval: Duration::from_secs(3600),
            rotation_grace: Duration::ZERO,
        }
    }
}

/// Round state plus its lock, shared between the event path and the
/// scheduler's fire path.
struct GroupHandle {
    state: Mutex<RoundState>,
}

pub struct GameService {
    catalog: Arc<WordCatalog>,
    ledger: Arc<ScoreLedger>,
    notifier: Arc<dyn NotifierPort>,
    scheduler: RoundScheduler,
    groups: Mutex<HashMap<i64, Arc<GroupHandle>>>,
    settings: GameSettings,
}

impl GameService {
    pub fn new(
        catalog: Arc<WordCatalog>,
        ledger: Arc<ScoreLedger>,
        notifier: Arc<dyn NotifierPort>,
        settings: GameSettings,
    ) -> Self {
        Self {
            catalog,
            ledger,
            notifier,
            scheduler: RoundScheduler::new(),
            groups: Mutex::new(HashMap::new()),
            settings,
        }
    }

    /// Entry point for every inbound event. Called once per event; events
    /// for different groups may run concurrently.
    pub async fn handle_event(self: Arc<Self>, event: ChatEvent) {
        match event {
            ChatEvent::Command {
                group_id,
                user,
                command,
            } => self.handle_command(group_id, user, command).await,
            ChatEvent::Text {
                group_id,
                user,
                text,
            } => self.handle_text(group_id, user, text).await,
        }
    }

    /// Rotate the group's round: expiry notice for an active round, then the
    /// next word. On an idle group this is a plain start with no notice.
    /// Safe to call for groups that were never referenced.
    pub async fn rotate_group(&self, group_id: i64) {
        let handle = self.group(group_id).await;
        let expired = {
            let mut state = handle.state.lock().await;
            state.finish()
        };
        if let Some(word) = expired {
            info!(group_id, word = %word.target, "round expired");
            self.send(
                group_id,
                &format!("⏰ Die Zeit ist um! Das Wort war *{}*.", word.target),
                true,
            )
            .await;
            if !self.settings.rotation_grace.is_zero() {
                tokio::time::sleep(self.settings.rotation_grace).await;
            }
        }
        let entry = {
            let mut state = handle.state.lock().await;
            let (entry, cursor) = self.catalog.next(self.settings.selection, state.cursor());
            state.set_cursor(cursor);
            state.begin(entry.clone());
            entry
        };
        info!(group_id, word = %entry.source, "round rotated");
        self.send(group_id, &round_announcement(&entry), true).await;
    }

    /// Cancel every group timer. Called on shutdown.
    pub async fn shutdown(&self) {
        self.scheduler.cancel_all().await;
    }

    async fn handle_command(self: Arc<Self>, group_id: i64, user: UserRef, command: Command) {
        debug!(group_id, user_id = user.id, ?command, "command received");
        match command {
            Command::StartGame => self.start_round(group_id, &user).await,
            Command::EndGame => self.end_round(group_id, &user).await,
            Command::RestartGame => self.restart_game(group_id, &user).await,
            Command::Score => self.show_score(group_id, &user).await,
            Command::ScoreAll => {
                self.show_ranking(group_id, "📊 *Punktestand aller Teilnehmer:*")
                    .await
            }
            Command::Leaderboard => {
                self.show_ranking(group_id, "🏆 *Tabelle der Besten:*").await
            }
            Command::Rules => self.send(group_id, &self.rules_text(), false).await,
            Command::ResetScores => self.reset_scores(group_id, &user).await,
            Command::AutoOn => self.auto_on(group_id, &user).await,
            Command::AutoOff => self.auto_off(group_id, &user).await,
        }
    }

    async fn handle_text(&self, group_id: i64, user: UserRef, text: String) {
        let handle = self.group(group_id).await;
        let outcome = {
            let mut state = handle.state.lock().await;
            guess::evaluate(&mut state, &user, &text, self.settings.points)
        };
        // No active round: the message is not for us.
        let Some(outcome) = outcome else { return };

        let scope = self.ledger.scope_key(group_id);
        match outcome {
            Evaluation::BonusAwarded { points } => {
                let total = self.ledger.award(&scope, &user, points).await;
                debug!(group_id, user_id = user.id, total, "bonus claimed");
                self.send(
                    group_id,
                    &format!(
                        "Perfekt, {}! Du bekommst +{} {} für {}. 🔥",
                        user.display_name,
                        points,
                        punkte(points),
                        BONUS_KEYWORD
                    ),
                    false,
                )
                .await;
            }
            // Repeated claims and repeated sentences are silent no-ops.
            Evaluation::BonusAlreadyClaimed | Evaluation::SentenceIgnored => {}
            Evaluation::FirstGuessCorrect { points } => {
                let total = self.ledger.award(&scope, &user, points).await;
                info!(group_id, user_id = user.id, total, "first correct guess");
                self.send(
                    group_id,
                    &format!(
                        "Sehr gut, {}! Du warst der Erste und bekommst +{} {}.",
                        user.display_name,
                        points,
                        punkte(points)
                    ),
                    false,
                )
                .await;
            }
            Evaluation::GuessIncorrect { article_hint: true } => {
                self.send(
                    group_id,
                    "Fast! Bist du sicher, dass du den Artikel richtig hast (der, die, das)?",
                    false,
                )
                .await;
            }
            Evaluation::GuessIncorrect {
                article_hint: false,
            }
            | Evaluation::SentenceMissingWord => {
                self.send(group_id, "Fast! Hast du das Wort richtig geschrieben?", false)
                    .await;
            }
            Evaluation::TooLate { first } => {
                self.send(
                    group_id,
                    &format!("Leider zu spät, {} war schneller! 😉", first.display_name),
                    false,
                )
                .await;
            }
            Evaluation::SentenceTooShort => {
                self.send(
                    group_id,
                    "Dein Satz ist leider zu kurz... Bitte mindestens 5 Wörter verwenden!",
                    false,
                )
                .await;
            }
            Evaluation::SentenceAccepted { points } => {
                let total = self.ledger.award(&scope, &user, points).await;
                debug!(group_id, user_id = user.id, total, "sentence accepted");
                self.send(
                    group_id,
                    &format!(
                        "Sehr gut, {}! Du erhältst +{} {}.",
                        user.display_name,
                        points,
                        punkte(points)
                    ),
                    false,
                )
                .await;
            }
        }
    }

    async fn start_round(&self, group_id: i64, user: &UserRef) {
        if !self.is_moderator(user) {
            self.send(group_id, "Nur der Admin darf das Spiel starten.", false)
                .await;
            return;
        }
        let handle = self.group(group_id).await;
        let started = {
            let mut state = handle.state.lock().await;
            if state.is_active() {
                None
            } else {
                let (entry, cursor) = self.catalog.next(self.settings.selection, state.cursor());
                state.set_cursor(cursor);
                state.begin(entry.clone());
                Some(entry)
            }
        };
        match started {
            None => {
                self.send(group_id, "Es läuft bereits eine Runde!", false)
                    .await
            }
            Some(entry) => {
                info!(group_id, word = %entry.source, "round started");
                self.send(group_id, &self.rules_text(), false).await;
                self.send(group_id, &round_announcement(&entry), true).await;
            }
        }
    }

    async fn end_round(&self, group_id: i64, user: &UserRef) {
        if !self.is_moderator(user) {
            self.send(group_id, "Nur der Admin darf das Spiel beenden.", false)
                .await;
            return;
        }
        let handle = self.group(group_id).await;
        let finished = handle.state.lock().await.finish();
        match finished {
            None => {
                self.send(group_id, "Es läuft aktuell keine Runde.", false)
                    .await
            }
            Some(word) => {
                self.scheduler.cancel(group_id).await;
                info!(group_id, word = %word.target, "round ended");
                self.send(group_id, "Die Runde wurde beendet.", false).await;
            }
        }
    }

    async fn restart_game(&self, group_id: i64, user: &UserRef) {
        if !self.is_moderator(user) {
            self.send(group_id, "Nur der Admin darf das Spiel neu starten.", false)
                .await;
            return;
        }
        let handle = self.group(group_id).await;
        handle.state.lock().await.restart();
        self.scheduler.cancel(group_id).await;
        info!(group_id, "game restarted, word list rewound");
        self.send(
            group_id,
            "Das Spiel wurde komplett neu gestartet! Die Punkte bleiben jedoch bestehen.\nStarte eine neue Runde mit /startgame.",
            false,
        )
        .await;
    }

    async fn show_score(&self, group_id: i64, user: &UserRef) {
        let scope = self.ledger.scope_key(group_id);
        let points = self.ledger.get(&scope, user.id).await;
        self.send(
            group_id,
            &format!("{}, dein Punktestand: {}", user.display_name, points),
            false,
        )
        .await;
    }

    async fn show_ranking(&self, group_id: i64, header: &str) {
        let scope = self.ledger.scope_key(group_id);
        let rows = self.ledger.leaderboard(&scope).await;
        if rows.is_empty() {
            self.send(group_id, "Noch keine Punkte vorhanden.", false)
                .await;
            return;
        }
        let mut text = format!("{}\n\n", header);
        for (idx, row) in rows.iter().enumerate() {
            text.push_str(&format!(
                "{}. {}: {} {}\n",
                idx + 1,
                row.display_name,
                row.points,
                punkte(row.points)
            ));
        }
        self.send(group_id, &text, true).await;
    }

    async fn reset_scores(&self, group_id: i64, user: &UserRef) {
        if !self.is_moderator(user) {
            self.send(group_id, "Nur der Admin darf die Punkte zurücksetzen.", false)
                .await;
            return;
        }
        let scope = self.ledger.scope_key(group_id);
        self.ledger.reset_all(&scope).await;
        info!(group_id, scope = %scope, "scores reset");
        self.send(group_id, "Alle Punkte wurden zurückgesetzt.", false)
            .await;
    }

    async fn auto_on(self: Arc<Self>, group_id: i64, user: &UserRef) {
        if !self.is_moderator(user) {
            self.send(
                group_id,
                "Nur der Admin darf den automatischen Modus einschalten.",
                false,
            )
            .await;
            return;
        }
        if self.scheduler.is_scheduled(group_id).await {
            self.send(group_id, "Der automatische Modus ist bereits aktiviert!", false)
                .await;
            return;
        }
        let service = Arc::clone(&self);
        self.scheduler
            .schedule(group_id, self.settings.round_interval, move || {
                let service = Arc::clone(&service);
                async move {
                    service.rotate_group(group_id).await;
                }
            })
            .await;
        let minutes = self.settings.round_interval.as_secs() / 60;
        self.send(
            group_id,
            &format!(
                "Okay, ich starte jetzt alle {} Minuten automatisch eine neue Runde!",
                minutes
            ),
            false,
        )
        .await;
    }

    async fn auto_off(&self, group_id: i64, user: &UserRef) {
        if !self.is_moderator(user) {
            self.send(
                group_id,
                "Nur der Admin darf den automatischen Modus ausschalten.",
                false,
            )
            .await;
            return;
        }
        if !self.scheduler.is_scheduled(group_id).await {
            self.send(group_id, "Der automatische Modus ist momentan nicht aktiv.", false)
                .await;
            return;
        }
        self.scheduler.cancel(group_id).await;
        self.send(group_id, "Alles klar, kein automatisches Starten mehr!", false)
            .await;
    }

    /// Fetch or lazily create the group's handle.
    async fn group(&self, group_id: i64) -> Arc<GroupHandle> {
        let mut groups = self.groups.lock().await;
        Arc::clone(groups.entry(group_id).or_insert_with(|| {
            Arc::new(GroupHandle {
                state: Mutex::new(RoundState::default()),
            })
        }))
    }

    fn is_moderator(&self, user: &UserRef) -> bool {
        match &self.settings.admin_id {
            Some(admin_id) => user.id.to_string() == *admin_id,
            None => true,
        }
    }

    async fn send(&self, group_id: i64, text: &str, markdown: bool) {
        if let Err(e) = self.notifier.send(group_id, text, markdown).await {
            warn!(group_id, error = %e, "failed to send reply");
        }
    }

    fn rules_text(&self) -> String {
        let p = self.settings.points;
        format!(
            "So ihr Lieben! Hier bekommt ihr regelmäßig neue Wörter, die ihr lernen könnt. \
             Dabei könnt ihr auch Punkte sammeln.\n\n\
             1️⃣ Der Erste, der das Wort richtig übersetzt, bekommt +{} {}.\n\
             2️⃣ Danach könnt ihr – alle unabhängig voneinander – einen richtigen Satz mit dem Wort bilden und dafür +{} {} bekommen.\n\
             3️⃣ Wenn ihr '{}' schreibt, bekommt ihr +{} {} (dafür müsst ihr das Wort 4x in echten Gesprächen und 4x schriftlich benutzen!).\n\n\
             📌 WICHTIG: Beim Schreiben eurer Sätze bitte auf die Grammatik achten!\n\
             ➤ Immer den richtigen Artikel benutzen (der, die, das).\n\
             ➤ Ein Satz sollte mindestens 5 Wörter haben.\n\
             ➤ Alle Nomen im Deutschen schreibt man groß.\n\n\
             Viel Erfolg und viel Spaß beim Deutschlernen! 🇩🇪✨",
            p.first_guess,
            punkte(p.first_guess),
            p.sentence,
            punkte(p.sentence),
            BONUS_KEYWORD,
            p.bonus,
            punkte(p.bonus)
        )
    }
}

fn round_announcement(entry: &WordEntry) -> String {
    format!(
        "⚡️ *Neue Runde!*\n📝 Das Wort auf Russisch: *{}*\n\nBitte übersetzt dieses Wort ins Deutsche! 🚀",
        entry.source
    )
}

fn punkte(n: u64) -> &'static str {
    if n == 1 {
        "Punkt"
    } else {
        "Punkte"
    }
}
