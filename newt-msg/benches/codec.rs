use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use newt_msg::{Code, Id, OptNumber, Pdu, TryFromBytes, Type};

#[derive(Debug, PartialEq, PartialOrd, Ord, Eq)]
struct TestInput {
  tkl: u8,
  n_opts: u16,
  opt_size: usize,
  payload_size: usize,
}

impl TestInput {
  fn get_pdu(&self) -> Pdu {
    let mut pdu = Pdu::init(Type::Non, Code::CONTENT, Id(1), 1 << 16);
    let token = core::iter::repeat(1u8).take(self.tkl as _).collect::<Vec<_>>();
    let opt_value = core::iter::repeat(1u8).take(self.opt_size).collect::<Vec<_>>();
    let payload = core::iter::repeat(1u8).take(self.payload_size).collect::<Vec<_>>();

    pdu.add_token(&token).unwrap();
    (0..self.n_opts).for_each(|n| {
                      pdu.add_option(OptNumber(n), &opt_value).unwrap();
                    });
    pdu.add_payload(&payload).unwrap();
    pdu
  }

  fn get_bytes(&self) -> Vec<u8> {
    self.get_pdu().as_bytes().to_vec()
  }
}

fn inputs() -> Vec<TestInput> {
  [(0, 0, 0, 0),
   (4, 4, 8, 16),
   (4, 8, 32, 16),
   (8, 8, 64, 128),
   (8, 16, 64, 512),
   (8, 32, 256, 2048),
   (8, 32, 512, 4096)].into_iter()
                      .map(|(tkl, n_opts, opt_size, payload_size)| TestInput { tkl,
                                                                               n_opts,
                                                                               opt_size,
                                                                               payload_size })
                      .collect()
}

fn message_to_bytes(c: &mut Criterion) {
  let mut group = c.benchmark_group("msg/to_bytes");
  group.measurement_time(std::time::Duration::from_secs(5));

  for inp in inputs().iter() {
    let bytes = inp.get_bytes();

    group.bench_with_input(BenchmarkId::new("newt_msg/size", bytes.len()), inp, |b, inp| {
           b.iter(|| inp.get_pdu())
         });

    let cl_packet = coap_lite::Packet::from_bytes(&bytes).unwrap();
    group.bench_with_input(BenchmarkId::new("coap_lite/size", bytes.len()),
                           &cl_packet,
                           |b, inp| b.iter(|| inp.to_bytes()));
  }
  group.finish();
}

fn message_from_bytes(c: &mut Criterion) {
  let mut group = c.benchmark_group("msg/from_bytes");
  group.measurement_time(std::time::Duration::from_secs(5));

  for inp in inputs().iter() {
    let bytes = inp.get_bytes();

    group.bench_with_input(BenchmarkId::new("newt_msg/size", bytes.len()),
                           &bytes,
                           |b, bytes| {
                             b.iter_batched(|| bytes.clone(),
                                            |bytes| {
                                              let pdu = Pdu::try_from_bytes(&bytes).unwrap();
                                              pdu.opts().count()
                                            },
                                            BatchSize::SmallInput)
                           });

    group.bench_with_input(BenchmarkId::new("coap_lite/size", bytes.len()),
                           &bytes,
                           |b, bytes| {
                             b.iter_batched(|| bytes.clone(),
                                            |bytes| coap_lite::Packet::from_bytes(&bytes).unwrap(),
                                            BatchSize::SmallInput)
                           });
  }
  group.finish();
}

criterion_group!(benches, message_to_bytes, message_from_bytes);
criterion_main!(benches);
