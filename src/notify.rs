use crate::model::BookingInterval;
use crate::store::BookingStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Résumé de changement poussé aux abonnés (diff par ensemble d'intervalles,
/// pas par simple comptage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub date: NaiveDate,
    pub added: Vec<BookingInterval>,
    pub removed: Vec<BookingInterval>,
}

/// Poignée d'abonnement ; clonable pour se désabonner depuis le callback.
#[derive(Debug, Clone)]
pub struct Subscription {
    stop: Arc<AtomicBool>,
}

impl Subscription {
    /// Arrête le poll et libère le callback au prochain tick.
    /// Idempotent et réentrant (appelable depuis le callback lui-même).
    pub fn unsubscribe(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        !self.stop.load(Ordering::Relaxed)
    }
}

/// Canal latéral de rafraîchissement : poll le magasin par date abonnée et
/// notifie les callbacks quand l'instantané change.
///
/// Un thread de poll par abonnement, y compris pour une même date abonnée
/// plusieurs fois. Limitation de montée en charge assumée : pas de
/// mutualisation des timers tant que le nombre d'abonnés reste petit.
pub struct Notifier {
    store: Arc<dyn BookingStore>,
    poll_interval: Duration,
}

impl Notifier {
    pub fn new(store: Arc<dyn BookingStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Intervalle de poll par défaut : 30 s.
    pub fn with_default_interval(store: Arc<dyn BookingStore>) -> Self {
        Self::new(store, Duration::from_secs(30))
    }

    /// Abonne un callback aux changements d'une journée.
    ///
    /// Le premier instantané sert de base de comparaison et ne déclenche pas
    /// le callback. Une erreur du magasin saute le tick, le poll continue.
    ///
    /// Le thread de poll ne s'arrête qu'au [`Subscription::unsubscribe`] :
    /// lâcher toutes les poignées sans se désabonner laisse le poll tourner
    /// pour toute la vie du process.
    pub fn subscribe<F>(&self, date: NaiveDate, mut callback: F) -> Subscription
    where
        F: FnMut(ChangeSummary) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let store = Arc::clone(&self.store);
        let interval = self.poll_interval;

        thread::spawn(move || {
            let mut previous: Option<HashSet<BookingInterval>> = None;
            while !flag.load(Ordering::Relaxed) {
                match store.intervals_for_date(date) {
                    Ok(intervals) => {
                        let current: HashSet<BookingInterval> = intervals.into_iter().collect();
                        if let Some(prev) = &previous {
                            if *prev != current {
                                let mut added: Vec<BookingInterval> =
                                    current.difference(prev).cloned().collect();
                                let mut removed: Vec<BookingInterval> =
                                    prev.difference(&current).cloned().collect();
                                added.sort_by_key(|b| b.slot);
                                removed.sort_by_key(|b| b.slot);
                                callback(ChangeSummary {
                                    date,
                                    added,
                                    removed,
                                });
                            }
                        }
                        previous = Some(current);
                    }
                    Err(err) => {
                        tracing::warn!(%date, error = %err, "store poll failed, tick skipped");
                    }
                }
                // Le callback peut s'être désabonné lui-même.
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                thread::sleep(interval);
            }
        });

        Subscription { stop }
    }
}
