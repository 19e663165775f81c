/// Opening a client does not touch the network; connections are made per
/// cache operation and failures there are treated as cache misses.
pub fn client(uri: &str) -> Result<redis::Client, redis::RedisError> {
    redis::Client::open(uri)
}
