// Notification ringbuffer - session (producer) to front-end (consumer)

use crate::messaging::notification::Notification;
use ringbuf::{HeapRb, traits::Split};

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    HeapRb::<Notification>::new(capacity).split()
}

/// Take every pending notification, oldest first
pub fn drain_notifications(rx: &mut NotificationConsumer) -> Vec<Notification> {
    ringbuf::traits::Consumer::pop_iter(rx).collect()
}
