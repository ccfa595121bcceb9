use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pocketboy_core::hardware::cartridge::Cartridge;
use pocketboy_core::hardware::cpu::Cpu;
use pocketboy_core::hardware::mmu::Memory;

/// A synthetic ROM covering a representative instruction mix (loads,
/// arithmetic, a conditional jump back to the start) rather than a real game,
/// so the benchmark doesn't depend on any file on disk.
fn synthetic_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    let program: &[u8] = &[
        0x3E, 0x01, // LD A,1
        0x06, 0x10, // LD B,0x10
        0x80, // ADD A,B
        0xCB, 0x37, // SWAP A
        0x3D, // DEC A
        0x20, 0xF8, // JR NZ,-8
        0x00, // NOP
        0x18, 0xF4, // JR -12 (loop forever)
    ];
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    rom
}

fn cpu_for_bench() -> Cpu<Memory> {
    let cartridge = Cartridge::new(synthetic_rom(), None).unwrap();
    let memory = Memory::new(cartridge, None);
    Cpu::new_post_boot(memory)
}

fn step_benchmark(c: &mut Criterion) {
    let mut cpu = cpu_for_bench();
    c.bench_function("cpu step", |b| {
        b.iter(|| {
            let cycles = cpu.step();
            black_box(cycles);
        })
    });
}

fn frame_benchmark(c: &mut Criterion) {
    c.bench_function("run one frame", |b| {
        b.iter(|| {
            let mut cpu = cpu_for_bench();
            let mut scheduler = pocketboy_core::scheduler::Scheduler::new();
            scheduler.run_frame(&mut cpu);
            black_box(&cpu);
        })
    });
}

criterion_group!(benches, step_benchmark, frame_benchmark);
criterion_main!(benches);
